//! Error categorization and retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::stats::ProcessingStats;
use super::types::{ErrorType, GatewayError};

/// Creates the backoff used between general-layer retries.
///
/// The sequence starts at `RETRY_INITIAL_DELAY_MS`, multiplies by `RETRY_FACTOR` per
/// attempt and is capped at `RETRY_MAX_DELAY_MS`. It never ends: the general layer
/// retries until the call succeeds or fails terminally.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    // tokio-retry yields base^n * factor, so base = RETRY_FACTOR and the factor scales
    // the first delay up to RETRY_INITIAL_DELAY_MS.
    ExponentialBackoff::from_millis(crate::config::RETRY_FACTOR)
        .factor(crate::config::RETRY_INITIAL_DELAY_MS / crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_millis(crate::config::RETRY_MAX_DELAY_MS))
}

/// Maps a gateway failure to its statistics category.
pub fn categorize_gateway_error(error: &GatewayError) -> ErrorType {
    match error {
        GatewayError::Throttled(_) => ErrorType::Throttled,
        GatewayError::ClientError { .. } => ErrorType::ClientError,
        GatewayError::ServerError { .. } => ErrorType::ServerError,
        GatewayError::NetworkError(_) => ErrorType::NetworkError,
        GatewayError::CircuitOpen => ErrorType::CircuitOpen,
        GatewayError::RateExceeded { .. } => ErrorType::RateExceeded,
        GatewayError::Decode(_) => ErrorType::DecodeError,
    }
}

/// Records one gateway failure in `stats`.
pub fn update_error_stats(stats: &ProcessingStats, error: &GatewayError) {
    stats.increment_error(categorize_gateway_error(error));
}
