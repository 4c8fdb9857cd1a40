//! Bounded-parallel track resolution and batched bulk apply.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ImportError, ProcessingStats, WarningType};
use crate::models::Track;

use super::outcome::{BatchSummary, ImportOutcome};
use super::traits::{BatchApplier, TrackResolver};

/// Live counters of the resolve stage, read by the progress logger.
#[derive(Debug, Default)]
pub struct ResolveProgress {
    /// Tracks matched to a remote id
    pub resolved: AtomicUsize,
    /// Tracks without a match or whose search failed
    pub unresolved: AtomicUsize,
    /// Searches currently running
    pub in_flight: AtomicUsize,
}

impl ResolveProgress {
    /// Tracks settled so far.
    pub fn completed(&self) -> usize {
        self.resolved.load(Ordering::SeqCst) + self.unresolved.load(Ordering::SeqCst)
    }
}

/// Resolves `tracks` with at most `concurrency` searches in flight.
///
/// A worker slot is acquired before the next track is taken from the input, so the
/// pipeline never runs ahead of its workers. A failed search marks only that track as
/// unresolved. Outcomes are returned in input order.
///
/// # Errors
///
/// Returns `ImportError::Cancelled` once `cancel` fires: no further tracks are
/// dispatched and in-flight searches are aborted. Calls already sent are not undone.
pub async fn resolve_tracks<R: TrackResolver>(
    resolver: Arc<R>,
    tracks: Vec<Track>,
    concurrency: usize,
    cancel: &CancellationToken,
    progress: Arc<ResolveProgress>,
) -> Result<Vec<ImportOutcome>, ImportError> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut settled: Vec<Option<ImportOutcome>> = vec![None; tracks.len()];
    let mut tasks: FuturesUnordered<JoinHandle<(usize, ImportOutcome)>> = FuturesUnordered::new();

    for (index, track) in tracks.iter().cloned().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tasks.iter().for_each(|t| t.abort());
                return Err(ImportError::Cancelled);
            }
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Worker pool closed, skipping {}", track);
                    continue;
                }
            },
        };

        let resolver = Arc::clone(&resolver);
        let progress = Arc::clone(&progress);
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            progress.in_flight.fetch_add(1, Ordering::SeqCst);
            let outcome = match resolver.resolve(&track).await {
                Ok(Some(id)) => {
                    progress.resolved.fetch_add(1, Ordering::SeqCst);
                    ImportOutcome::resolved(track, id)
                }
                Ok(None) => {
                    log::debug!("No match for {}", track);
                    progress.unresolved.fetch_add(1, Ordering::SeqCst);
                    ImportOutcome::not_found(track)
                }
                Err(e) => {
                    log::warn!("Giving up on {}: {}", track, e);
                    progress.unresolved.fetch_add(1, Ordering::SeqCst);
                    ImportOutcome::failed(track)
                }
            };
            progress.in_flight.fetch_sub(1, Ordering::SeqCst);
            (index, outcome)
        }));

        // Collect whatever already finished so the set of handles stays small.
        while let Some(Some(joined)) = tasks.next().now_or_never() {
            record(&mut settled, joined);
        }
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tasks.iter().for_each(|t| t.abort());
                return Err(ImportError::Cancelled);
            }
            next = tasks.next() => match next {
                Some(joined) => record(&mut settled, joined),
                None => break,
            },
        }
    }

    Ok(settled
        .into_iter()
        .zip(tracks)
        .map(|(outcome, track)| outcome.unwrap_or_else(|| ImportOutcome::failed(track)))
        .collect())
}

fn record(
    settled: &mut [Option<ImportOutcome>],
    joined: Result<(usize, ImportOutcome), JoinError>,
) {
    match joined {
        Ok((index, outcome)) => {
            if let Some(slot) = settled.get_mut(index) {
                *slot = Some(outcome);
            }
        }
        Err(e) => log::warn!("Resolve task failed: {}", e),
    }
}

/// Applies `ids` in batches of `applier.batch_size()`.
///
/// Every batch is attempted even after one fails; the summary records how many failed.
///
/// # Errors
///
/// Returns `ImportError::Cancelled` if `cancel` fires before or during a batch. A
/// batch call interrupted this way may still have reached the remote API.
pub async fn apply_in_batches<A: BatchApplier>(
    applier: &A,
    ids: &[String],
    cancel: &CancellationToken,
    stats: &ProcessingStats,
) -> Result<BatchSummary, ImportError> {
    let mut summary = BatchSummary::default();
    let size = applier.batch_size().max(1);

    for (n, batch) in ids.chunks(size).enumerate() {
        summary.batches += 1;
        let applied = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ImportError::Cancelled),
            applied = applier.apply_batch(batch) => applied,
        };
        match applied {
            Ok(()) => log::debug!("Batch {} applied ({} ids)", n + 1, batch.len()),
            Err(e) => {
                summary.failed_batches += 1;
                stats.increment_warning(WarningType::BatchFailed);
                log::warn!("Batch {} ({} ids) failed: {}", n + 1, batch.len(), e);
            }
        }
    }
    Ok(summary)
}
