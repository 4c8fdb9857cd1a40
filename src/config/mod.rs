//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (gateway defaults, API batch limits, retry timing)
//! - CLI option types and parsing
//! - Gateway tuning derived from the CLI options

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    default_worker_concurrency, Config, GatewayConfig, ImportTarget, LogFormat, LogLevel,
};
