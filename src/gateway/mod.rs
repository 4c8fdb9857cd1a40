//! Outbound request gateway.
//!
//! Every call to the remote API goes through [`Gateway::execute`], which combines:
//!
//! - [`RequestGate`]: breaker check plus token-bucket admission
//! - [`AdaptiveRateController`]: damped budget shrink on throttling
//! - [`TrafficBreaker`]: global pause while a throttling wait or failure cooldown runs
//! - two retry layers (throttling-specific and general resilience)
//!
//! A `Gateway` is meant to be built once per remote API and shared behind an `Arc`.

mod breaker;
mod budget;
mod controller;
mod gate;
mod retry;

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error_handling::ProcessingStats;

pub use breaker::{BreakerState, TrafficBreaker};
pub use budget::{RateBudget, RateLimiter};
pub use controller::{AdaptiveRateController, BudgetShrink, DecrementCounter};
pub use gate::RequestGate;

/// Shared gateway state for one remote API.
pub struct Gateway {
    gate: RequestGate,
    controller: AdaptiveRateController,
    default_retry_after: Duration,
    stats: Arc<ProcessingStats>,
}

impl Gateway {
    /// Creates a gateway with its own statistics.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_stats(config, Arc::new(ProcessingStats::new()))
    }

    /// Creates a gateway that records into `stats`.
    pub fn with_stats(config: GatewayConfig, stats: Arc<ProcessingStats>) -> Self {
        let config = config.sanitized();
        Gateway {
            gate: RequestGate::new(&config),
            controller: AdaptiveRateController::new(config.worker_concurrency),
            default_retry_after: config.default_retry_after,
            stats,
        }
    }

    /// The request gate (budget and breaker).
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// The adaptive controller.
    pub fn controller(&self) -> &AdaptiveRateController {
        &self.controller
    }

    /// Statistics shared with the rest of the run.
    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// Current budget snapshot.
    pub async fn budget(&self) -> RateBudget {
        self.gate.budget().await
    }

    /// Current breaker state.
    pub async fn breaker_state(&self) -> BreakerState {
        self.gate.breaker_state().await
    }
}
