//! Retry orchestration.
//!
//! Two layers wrap every call, innermost first:
//!
//! - **Throttling layer**: on `Throttled`, forces the breaker open, feeds the adaptive
//!   controller, sleeps the advisory (or default) wait, releases the breaker and tries
//!   again. It never gives up on throttling.
//! - **General layer**: retries everything except non-throttling client errors and
//!   undecodable responses, with capped exponential backoff. `CircuitOpen` and
//!   `RateExceeded` from the gate land here and are simply resubmitted later.

use std::future::Future;

use tokio::time::sleep;
use tokio_retry::RetryIf;

use crate::error_handling::{
    get_retry_strategy, update_error_stats, GatewayError, InfoType, ThrottleSignal,
};

use super::Gateway;

impl Gateway {
    /// Runs `op` through the gateway until it succeeds or fails terminally.
    ///
    /// `op` performs one HTTP call and maps the response to the outbound-call contract;
    /// it is invoked once per attempt. `label` identifies the call in logs.
    ///
    /// # Errors
    ///
    /// Only terminal errors are returned: `ClientError` (non-throttling 4xx) and
    /// `Decode`. Throttling, server, network and admission failures are retried.
    pub async fn execute<T, F, Fut>(&self, label: &str, op: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let op = &op;
        RetryIf::spawn(
            get_retry_strategy(),
            move || self.retry_throttled(label, op),
            |err: &GatewayError| self.should_retry(label, err),
        )
        .await
    }

    /// Throttling layer: retries indefinitely while the call keeps being throttled.
    async fn retry_throttled<T, F, Fut>(&self, label: &str, op: &F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        loop {
            match self.attempt(op).await {
                Err(GatewayError::Throttled(signal)) => {
                    self.wait_out_throttle(label, &signal).await
                }
                other => return other,
            }
        }
    }

    /// One admission plus one call, with breaker bookkeeping.
    async fn attempt<T, F, Fut>(&self, op: &F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let breaker = self.gate.breaker();
        let result = match self.gate.admit().await {
            Ok(()) => op().await,
            Err(rejected) => Err(rejected),
        };

        match &result {
            Ok(_) => breaker.record_success().await,
            Err(err) => {
                update_error_stats(&self.stats, err);
                if err.is_breaker_failure() && breaker.record_failure().await {
                    self.stats.increment_info(InfoType::BreakerOpened);
                }
            }
        }
        result
    }

    /// Global pause for one throttling response.
    async fn wait_out_throttle(&self, label: &str, signal: &ThrottleSignal) {
        let wait = signal.wait(self.default_retry_after);
        let breaker = self.gate.breaker();

        if breaker.force_open(wait).await {
            self.stats.increment_info(InfoType::BreakerForcedOpen);
        }
        if self
            .controller
            .on_throttled(self.gate.limiter(), wait)
            .await
            .is_some()
        {
            self.stats.increment_info(InfoType::BudgetShrink);
        }

        let budget = self.gate.budget().await;
        log::debug!(
            "{} throttled (request {}), pausing traffic for {:?}; budget now {} per {:?}",
            label,
            signal.request,
            wait,
            budget.permits_per_period,
            budget.period
        );
        self.stats.increment_info(InfoType::RetryAttempt);
        sleep(wait).await;
        breaker.release().await;
    }

    /// General layer filter.
    fn should_retry(&self, label: &str, err: &GatewayError) -> bool {
        if !err.is_retriable() {
            log::debug!("{} failed terminally: {}", label, err);
            return false;
        }
        match err {
            GatewayError::ServerError { status, .. } => {
                log::warn!("{} got server error {}, retrying", label, status);
            }
            GatewayError::NetworkError(msg) => {
                log::warn!("{} network error ({}), retrying", label, msg);
            }
            _ => log::debug!("{} rejected ({}), retrying", label, err),
        }
        self.stats.increment_info(InfoType::RetryAttempt);
        true
    }
}
