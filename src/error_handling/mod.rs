//! Error handling and processing statistics.
//!
//! This module provides:
//! - The gateway error taxonomy and its retriability predicates
//! - Import-level (fatal) errors and initialization errors
//! - Processing statistics (errors, warnings, gateway events)
//! - The general-layer retry strategy
//!
//! Gateway errors split into terminal ones (non-throttling 4xx, undecodable bodies)
//! and transient ones that are retried until they succeed.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_gateway_error, get_retry_strategy, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{
    ErrorType, GatewayError, ImportError, InfoType, InitializationError, ThrottleSignal,
    WarningType,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::Throttled);
        stats.increment_error(ErrorType::ServerError);
        stats.increment_warning(WarningType::UnresolvedTrack);
        stats.increment_info(InfoType::BudgetShrink);

        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_warnings(), 1);
        assert_eq!(stats.total_info(), 1);
    }

    #[test]
    fn test_processing_stats_concurrent_increments() {
        let stats = Arc::new(ProcessingStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.increment_info(InfoType::RetryAttempt);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker thread panicked");
        }
        assert_eq!(stats.get_info_count(InfoType::RetryAttempt), 800);
    }
}
