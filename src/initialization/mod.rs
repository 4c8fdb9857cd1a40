//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a run:
//! - Logger (plain or JSON)
//! - HTTP client for the remote API
//! - Outbound request gateway
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;

use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::gateway::Gateway;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Builds the shared gateway for the remote API, recording into `stats`.
pub fn init_gateway(config: &Config, stats: Arc<ProcessingStats>) -> Arc<Gateway> {
    let gateway_config = config.gateway_config();
    log::debug!(
        "Gateway: {} permits per {:?}, admission timeout {:?}, {} workers",
        gateway_config.permits_per_period,
        gateway_config.period,
        gateway_config.timeout,
        gateway_config.worker_concurrency
    );
    Arc::new(Gateway::with_stats(gateway_config, stats))
}
