//! Request gate.
//!
//! The single admission point for outbound calls: consults the traffic breaker first
//! and the rate budget second, so a paused gateway rejects without consuming a permit.

use crate::config::GatewayConfig;
use crate::error_handling::GatewayError;

use super::breaker::{BreakerState, TrafficBreaker};
use super::budget::{RateBudget, RateLimiter};

/// Gatekeeper owning the rate budget and the traffic breaker.
pub struct RequestGate {
    limiter: RateLimiter,
    breaker: TrafficBreaker,
}

impl RequestGate {
    /// Builds a gate with a full bucket and a closed breaker.
    pub fn new(config: &GatewayConfig) -> Self {
        RequestGate {
            limiter: RateLimiter::new(RateBudget {
                permits_per_period: config.permits_per_period,
                period: config.period,
                timeout: config.timeout,
            }),
            breaker: TrafficBreaker::with_threshold(
                config.breaker_failure_threshold,
                config.breaker_cooldown,
            ),
        }
    }

    /// Admits one call.
    ///
    /// # Errors
    ///
    /// - `CircuitOpen` immediately while the breaker is open or forced open, and also
    ///   when it opened while this caller was waiting for a reserved permit
    /// - `RateExceeded` immediately when no permit would arrive within the timeout
    pub async fn admit(&self) -> Result<(), GatewayError> {
        self.breaker.check().await?;
        self.limiter.acquire().await?;
        // The reservation sleep may have spanned a throttling window.
        self.breaker.check().await
    }

    /// The rate budget.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The traffic breaker.
    pub fn breaker(&self) -> &TrafficBreaker {
        &self.breaker
    }

    /// Current budget snapshot.
    pub async fn budget(&self) -> RateBudget {
        self.limiter.budget().await
    }

    /// Current breaker state.
    pub async fn breaker_state(&self) -> BreakerState {
        self.breaker.state().await
    }
}
