//! Per-item and per-import results.

use crate::models::Track;

/// Result of resolving one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// The track as parsed
    pub track: Track,
    /// Remote id, when a match was found
    pub resolved_id: Option<String>,
    /// `true` when resolution failed with an error rather than finding no match
    pub failed: bool,
}

impl ImportOutcome {
    /// A successful match.
    pub fn resolved(track: Track, id: String) -> Self {
        ImportOutcome {
            track,
            resolved_id: Some(id),
            failed: false,
        }
    }

    /// A search that completed without a match.
    pub fn not_found(track: Track) -> Self {
        ImportOutcome {
            track,
            resolved_id: None,
            failed: false,
        }
    }

    /// A search that failed terminally.
    pub fn failed(track: Track) -> Self {
        ImportOutcome {
            track,
            resolved_id: None,
            failed: true,
        }
    }
}

/// Outcome of the bulk-apply stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Batches issued
    pub batches: usize,
    /// Batches that failed definitively
    pub failed_batches: usize,
}

impl BatchSummary {
    /// Logical AND over all batch results (vacuously true with no batches).
    pub fn success(&self) -> bool {
        self.failed_batches == 0
    }
}

/// Aggregate result of one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    /// `true` when every bulk-apply batch succeeded
    pub success: bool,
    /// Remote ids that were resolved, in playlist order
    pub resolved_ids: Vec<String>,
    /// Tracks that could not be resolved, in playlist order
    pub unresolved: Vec<Track>,
    /// Bulk-apply statistics
    pub batches: BatchSummary,
}

/// Splits outcomes into resolved ids and unresolved tracks, keeping input order.
pub fn partition_outcomes(outcomes: Vec<ImportOutcome>) -> (Vec<String>, Vec<Track>) {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for outcome in outcomes {
        match outcome.resolved_id {
            Some(id) => resolved.push(id),
            None => unresolved.push(outcome.track),
        }
    }
    (resolved, unresolved)
}
