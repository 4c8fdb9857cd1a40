//! Progress logging utilities.

use log::info;
use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::importer::ResolveProgress;

/// Logs how many tracks have settled and the resolve rate so far.
pub fn log_progress(start_time: Instant, total: usize, progress: &ResolveProgress) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = progress.completed();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Resolved {}/{} tracks ({} unresolved, {} in flight) in {:.1}s (~{:.2} tracks/sec)",
        progress.resolved.load(Ordering::SeqCst),
        total,
        progress.unresolved.load(Ordering::SeqCst),
        progress.in_flight.load(Ordering::SeqCst),
        elapsed_secs,
        rate
    );
}
