//! Traffic breaker.
//!
//! A global switch in front of the remote API. It opens in two ways:
//!
//! - `ForcedOpen`: a throttling response was confirmed; every worker pauses until the
//!   advisory wait has elapsed.
//! - `Open`: too many consecutive server or network failures; calls are rejected for a
//!   cooldown period.
//!
//! While not `Closed`, [`TrafficBreaker::check`] rejects every call with `CircuitOpen`.
//! Both open states close lazily on the first check after their deadline, so a pause can
//! never outlive its window even if the task that opened it is cancelled.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error_handling::GatewayError;

/// Observable state of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Traffic flows
    Closed,
    /// Opened by consecutive failures; rejects until the cooldown elapses
    Open,
    /// Opened by a throttling response; rejects until the advisory wait elapses
    ForcedOpen,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    /// When the current open window ends (meaningless while `Closed`)
    until: Instant,
    consecutive_failures: u32,
}

impl Inner {
    fn expire(&mut self, now: Instant) {
        if self.state != BreakerState::Closed && now >= self.until {
            log::debug!("Traffic breaker: {:?} window elapsed, closing", self.state);
            self.close();
        }
    }

    fn close(&mut self) {
        self.state = BreakerState::Closed;
        self.consecutive_failures = 0;
    }
}

/// Three-state breaker shared by all outbound calls.
pub struct TrafficBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<Inner>,
}

impl TrafficBreaker {
    /// Creates a closed breaker that opens after `failure_threshold` consecutive failures
    /// and stays open for `cooldown`.
    pub fn with_threshold(failure_threshold: u32, cooldown: Duration) -> Self {
        TrafficBreaker {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                until: Instant::now(),
                consecutive_failures: 0,
            }),
        }
    }

    /// Fails fast with `CircuitOpen` unless traffic may flow.
    pub async fn check(&self) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().await;
        inner.expire(Instant::now());
        match inner.state {
            BreakerState::Closed => Ok(()),
            _ => Err(GatewayError::CircuitOpen),
        }
    }

    /// Current state, after closing any elapsed window.
    pub async fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock().await;
        inner.expire(Instant::now());
        inner.state
    }

    /// Pauses all traffic for `wait`.
    ///
    /// Concurrent calls collapse into one window whose deadline is the latest requested
    /// one. Returns `true` when this call started a new forced window rather than
    /// extending one that was already running.
    pub async fn force_open(&self, wait: Duration) -> bool {
        let now = Instant::now();
        let deadline = now + wait;
        let mut inner = self.inner.lock().await;
        inner.expire(now);

        let started = inner.state != BreakerState::ForcedOpen;
        let floor = match inner.state {
            BreakerState::Closed => deadline,
            _ => inner.until,
        };
        inner.until = deadline.max(floor);
        inner.state = BreakerState::ForcedOpen;
        if started {
            log::debug!("Traffic breaker: forced open for {:?}", wait);
        }
        started
    }

    /// Ends a forced window once its deadline has passed.
    ///
    /// Called by every worker that waited out a throttling delay. Workers whose wait ends
    /// before a later-extended deadline leave the breaker open for the others.
    pub async fn release(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == BreakerState::ForcedOpen && Instant::now() >= inner.until {
            log::debug!("Traffic breaker: closed after throttling wait");
            inner.close();
        }
    }

    /// Resets the consecutive failure count.
    pub async fn record_success(&self) {
        self.inner.lock().await.consecutive_failures = 0;
    }

    /// Counts a server or network failure. Returns `true` if this failure opened the
    /// breaker.
    pub async fn record_failure(&self) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.expire(now);
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        if inner.state == BreakerState::Closed && inner.consecutive_failures >= self.failure_threshold
        {
            inner.state = BreakerState::Open;
            inner.until = now + self.cooldown;
            log::warn!(
                "Traffic breaker: opened after {} consecutive failures (cooldown: {}s)",
                inner.consecutive_failures,
                self.cooldown.as_secs()
            );
            return true;
        }
        false
    }
}
