//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including gateway defaults, remote API batch limits, and retry parameters.

use std::time::Duration;

// Request gate defaults (N permits per fixed period, bounded admission wait)
/// Permits granted per refill period before any throttling has been observed
pub const DEFAULT_PERMITS_PER_PERIOD: u32 = 100;
/// Refill period in milliseconds
pub const DEFAULT_PERIOD_MS: u64 = 100;
/// Maximum time a caller may wait at the gate for a permit, in milliseconds
pub const DEFAULT_GATE_TIMEOUT_MS: u64 = 5_000;

/// Wait applied when a throttling response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Multiplicative decrease applied to the permit budget on a confirmed throttling batch.
/// Expressed as a ratio (9/10) so integer budgets shrink the same way every time.
pub const BUDGET_SHRINK_NUMERATOR: u32 = 9;
/// Denominator of the budget shrink ratio
pub const BUDGET_SHRINK_DENOMINATOR: u32 = 10;

// Traffic breaker (failure-count opening, separate from throttling)
/// Consecutive server/network failures before the breaker opens
pub const BREAKER_FAILURE_THRESHOLD: u32 = 5;
/// How long the breaker stays open after reaching the failure threshold
pub const BREAKER_COOLDOWN: Duration = Duration::from_secs(30);

// General resilience retry layer
/// Initial delay in milliseconds before the first general retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 50;
/// Factor by which the general retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between general retries in milliseconds.
/// Retries are unbounded in count; only the spacing is capped.
pub const RETRY_MAX_DELAY_MS: u64 = 1_000;

// Remote API batch limits (imposed by the service, not tunable)
/// Maximum ids per "save to liked songs" call
pub const LIKED_SONGS_BATCH_SIZE: usize = 50;
/// Maximum uris per "add to playlist" call
pub const PLAYLIST_BATCH_SIZE: usize = 100;
/// Page size when listing the user's playlists
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;

/// Default base URL of the remote music API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";
/// Prefix turning a track id into a playlist item uri.
pub const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Per-HTTP-call timeout in seconds (network round-trip, not gate admission)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Default User-Agent for outbound API calls.
pub const DEFAULT_USER_AGENT: &str = concat!("playlist_import/", env!("CARGO_PKG_VERSION"));

// Playlist parsing
/// Separator between track name and artist on a plain-text playlist line
pub const DEFAULT_TXT_DELIMITER: &str = " - ";
/// Marker identifying an iTunes library export
pub const ITUNES_XML_MARKER: &str = "www.apple.com";

/// Progress logging interval in seconds
pub const LOGGING_INTERVAL: u64 = 5;

// HTTP status codes (for clarity and consistency)
/// Status the remote service answers with when throttling
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
/// Advisory header carrying the throttling wait
pub const HEADER_RETRY_AFTER: &str = "Retry-After";
