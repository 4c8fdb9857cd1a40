//! Token-bucket rate budget.
//!
//! The bucket refills continuously at `permits_per_period / period`, capped at one
//! period's worth of permits, so a drained bucket reopens gradually instead of in a
//! burst at a period boundary.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::config::{BUDGET_SHRINK_DENOMINATOR, BUDGET_SHRINK_NUMERATOR};
use crate::error_handling::GatewayError;

/// Current admission budget of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    /// Permits granted per period; never below 1
    pub permits_per_period: u32,
    /// Refill period
    pub period: Duration,
    /// Longest a caller may wait for a permit
    pub timeout: Duration,
}

impl RateBudget {
    /// Permits per second implied by the budget.
    pub fn rate_per_sec(&self) -> f64 {
        self.permits_per_period as f64 / self.period.as_secs_f64()
    }

    /// Budget after one multiplicative decrease (9/10, floored at 1).
    pub fn shrunk(&self) -> u32 {
        let next = u64::from(self.permits_per_period) * u64::from(BUDGET_SHRINK_NUMERATOR)
            / u64::from(BUDGET_SHRINK_DENOMINATOR);
        (next as u32).max(1)
    }
}

#[derive(Debug)]
struct BucketState {
    budget: RateBudget,
    /// Available permits; negative while callers hold reservations on future refills
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            let cap = f64::from(self.budget.permits_per_period);
            self.tokens = (self.tokens + elapsed * self.budget.rate_per_sec()).min(cap);
            self.last_refill = now;
        }
    }
}

/// Shared token bucket enforcing a [`RateBudget`].
///
/// Admission uses reservations: a caller takes a permit immediately, even from a future
/// refill, and sleeps until that refill is due. If the due time lies beyond the budget's
/// timeout, the reservation is rolled back and the caller gets `RateExceeded` at once.
pub struct RateLimiter {
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Creates a full bucket for `budget`.
    pub fn new(budget: RateBudget) -> Self {
        let budget = RateBudget {
            permits_per_period: budget.permits_per_period.max(1),
            ..budget
        };
        RateLimiter {
            state: Mutex::new(BucketState {
                tokens: f64::from(budget.permits_per_period),
                budget,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Takes one permit, waiting for a refill if needed.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::RateExceeded` without waiting when no permit would become
    /// available within the budget's timeout.
    pub async fn acquire(&self) -> Result<(), GatewayError> {
        let wait = {
            let mut st = self.state.lock().await;
            st.refill(Instant::now());
            st.tokens -= 1.0;
            if st.tokens >= 0.0 {
                Duration::ZERO
            } else {
                let wait = Duration::from_secs_f64(-st.tokens / st.budget.rate_per_sec());
                if wait > st.budget.timeout {
                    st.tokens += 1.0;
                    return Err(GatewayError::RateExceeded {
                        waited: st.budget.timeout,
                    });
                }
                wait
            }
        };

        if !wait.is_zero() {
            sleep(wait).await;
        }
        Ok(())
    }

    /// Applies one multiplicative decrease and adopts `timeout` as the new admission
    /// timeout. Returns the permits before and after.
    pub async fn shrink(&self, timeout: Duration) -> (u32, u32) {
        let mut st = self.state.lock().await;
        st.refill(Instant::now());
        let before = st.budget.permits_per_period;
        let after = st.budget.shrunk();
        st.budget.permits_per_period = after;
        st.budget.timeout = timeout;
        st.tokens = st.tokens.min(f64::from(after));
        (before, after)
    }

    /// Snapshot of the current budget.
    pub async fn budget(&self) -> RateBudget {
        self.state.lock().await.budget
    }

    /// Permits available right now (negative while reservations are outstanding).
    pub async fn available(&self) -> f64 {
        let mut st = self.state.lock().await;
        st.refill(Instant::now());
        st.tokens
    }
}
