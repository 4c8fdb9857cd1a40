//! Bounded import pipeline.
//!
//! Resolves parsed tracks against the remote catalog with fixed worker concurrency,
//! then applies the resolved ids to the destination in API-sized batches.

mod outcome;
mod pipeline;
mod traits;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error_handling::{ImportError, ProcessingStats, WarningType};
use crate::models::Track;

pub use outcome::{partition_outcomes, BatchSummary, ImportOutcome, ImportResult};
pub use pipeline::{apply_in_batches, resolve_tracks, ResolveProgress};
pub use traits::{BatchApplier, Destination, LikedSongs, PlaylistTracks, TrackResolver};

/// Runs a whole import: resolve every track, then bulk-apply the matches.
///
/// Per-track failures end up in `ImportResult::unresolved`; batch failures make
/// `ImportResult::success` false without stopping later batches.
///
/// # Errors
///
/// Returns `ImportError::Cancelled` if `cancel` fires before the import completes.
pub async fn import_tracks<R, A>(
    resolver: Arc<R>,
    applier: &A,
    tracks: Vec<Track>,
    concurrency: usize,
    cancel: &CancellationToken,
    stats: &ProcessingStats,
    progress: Arc<ResolveProgress>,
) -> Result<ImportResult, ImportError>
where
    R: TrackResolver,
    A: BatchApplier,
{
    log::info!(
        "Resolving {} tracks with {} workers",
        tracks.len(),
        concurrency
    );
    let outcomes = resolve_tracks(resolver, tracks, concurrency, cancel, progress).await?;
    let (resolved_ids, unresolved) = partition_outcomes(outcomes);
    for _ in &unresolved {
        stats.increment_warning(WarningType::UnresolvedTrack);
    }
    log::info!(
        "Resolved {} tracks, {} unresolved; applying in batches of {}",
        resolved_ids.len(),
        unresolved.len(),
        applier.batch_size()
    );

    let batches = apply_in_batches(applier, &resolved_ids, cancel, stats).await?;
    Ok(ImportResult {
        success: batches.success(),
        resolved_ids,
        unresolved,
        batches,
    })
}
