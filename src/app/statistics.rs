//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use crate::gateway::RateBudget;

/// Logs every non-zero counter, grouped by category.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    if total_errors > 0 {
        info!("Gateway errors ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type, count);
            }
        }
    }

    let total_warnings = error_stats.total_warnings();
    if total_warnings > 0 {
        info!("Warnings ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if error_stats.total_info() > 0 {
        info!("Gateway events:");
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// Logs the budget the gateway ended the run with.
pub fn print_budget_summary(initial_permits: u32, budget: &RateBudget) {
    if budget.permits_per_period < initial_permits {
        info!(
            "Rate budget shrank from {} to {} permits per {:?} (admission timeout {:?})",
            initial_permits, budget.permits_per_period, budget.period, budget.timeout
        );
    } else {
        info!(
            "Rate budget unchanged: {} permits per {:?}",
            budget.permits_per_period, budget.period
        );
    }
}
