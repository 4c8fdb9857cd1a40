//! Adaptive rate controller.
//!
//! Shrinks the rate budget on confirmed throttling with collective damping: a burst of
//! throttling responses from `C` concurrent workers is usually one server-side limit
//! breach, so the budget shrinks once per `C` responses rather than once per response.
//! The controller never grows the budget.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::budget::RateLimiter;

/// Shared countdown of throttling events until the next budget shrink.
///
/// Starts at the worker concurrency. The decrement that brings it to zero resets it to
/// the initial value in the same atomic step, so exactly one caller per batch is told to
/// shrink.
#[derive(Debug)]
pub struct DecrementCounter {
    remaining: AtomicUsize,
    reset_to: usize,
}

impl DecrementCounter {
    /// Creates a counter that fires every `reset_to` decrements (at least 1).
    pub fn new(reset_to: usize) -> Self {
        let reset_to = reset_to.max(1);
        DecrementCounter {
            remaining: AtomicUsize::new(reset_to),
            reset_to,
        }
    }

    /// Counts one throttling event. Returns `true` if this event completed a batch.
    pub fn decrement(&self) -> bool {
        let reset_to = self.reset_to;
        let previous = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(if n <= 1 { reset_to } else { n - 1 })
            })
            .unwrap_or(reset_to);
        previous <= 1
    }

    /// Events still needed before the next shrink.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }
}

/// Budget change applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetShrink {
    /// Permits per period before the shrink
    pub from: u32,
    /// Permits per period after the shrink
    pub to: u32,
}

/// Reacts to throttling by shrinking the gate's budget.
pub struct AdaptiveRateController {
    counter: DecrementCounter,
}

impl AdaptiveRateController {
    /// Creates a controller damped over `worker_concurrency` throttling events.
    pub fn new(worker_concurrency: usize) -> Self {
        AdaptiveRateController {
            counter: DecrementCounter::new(worker_concurrency),
        }
    }

    /// Records one throttling response whose advisory (or default) wait is `wait`.
    ///
    /// Returns the applied shrink when this response completed a damping batch.
    pub async fn on_throttled(&self, limiter: &RateLimiter, wait: Duration) -> Option<BudgetShrink> {
        if !self.counter.decrement() {
            log::debug!(
                "Throttled; {} more before the budget shrinks",
                self.counter.remaining()
            );
            return None;
        }

        let (from, to) = limiter.shrink(wait).await;
        log::info!(
            "Adaptive rate controller: throttling confirmed, permits per period {} → {} (timeout {:?})",
            from,
            to,
            wait
        );
        Some(BudgetShrink { from, to })
    }

    /// The shared damping counter.
    pub fn counter(&self) -> &DecrementCounter {
        &self.counter
    }
}
