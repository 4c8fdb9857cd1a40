//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    BREAKER_COOLDOWN, BREAKER_FAILURE_THRESHOLD, DEFAULT_API_BASE_URL, DEFAULT_GATE_TIMEOUT_MS,
    DEFAULT_PERIOD_MS, DEFAULT_PERMITS_PER_PERIOD, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_AFTER, DEFAULT_TXT_DELIMITER, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where resolved tracks end up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImportTarget {
    /// Save every resolved track to the user's liked songs
    Liked,
    /// Append resolved tracks to a playlist (existing or newly created)
    Playlist,
}

/// Tuning for the outbound request gateway.
///
/// Defaults are the reference values: 100 permits every 100 ms, a 5 s admission
/// timeout, and one worker per available CPU.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Permits granted per refill period (never below 1)
    pub permits_per_period: u32,
    /// Length of one refill period
    pub period: Duration,
    /// Longest a caller may wait at the gate before `RateExceeded`
    pub timeout: Duration,
    /// Dispatch concurrency of the import pipeline; also the damping batch size
    pub worker_concurrency: usize,
    /// Wait used when a throttling response has no advisory header
    pub default_retry_after: Duration,
    /// Consecutive server/network failures before the breaker opens
    pub breaker_failure_threshold: u32,
    /// How long a failure-opened breaker rejects calls
    pub breaker_cooldown: Duration,
}

impl GatewayConfig {
    /// Returns a copy with out-of-range values pulled back into range.
    pub fn sanitized(mut self) -> Self {
        self.permits_per_period = self.permits_per_period.max(1);
        self.worker_concurrency = self.worker_concurrency.max(1);
        if self.period.is_zero() {
            self.period = Duration::from_millis(DEFAULT_PERIOD_MS);
        }
        self.breaker_failure_threshold = self.breaker_failure_threshold.max(1);
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            permits_per_period: DEFAULT_PERMITS_PER_PERIOD,
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
            timeout: Duration::from_millis(DEFAULT_GATE_TIMEOUT_MS),
            worker_concurrency: default_worker_concurrency(),
            default_retry_after: DEFAULT_RETRY_AFTER,
            breaker_failure_threshold: BREAKER_FAILURE_THRESHOLD,
            breaker_cooldown: BREAKER_COOLDOWN,
        }
    }
}

/// Number of workers used when none is configured: one per available CPU.
pub fn default_worker_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Command-line options and library configuration.
///
/// This struct is automatically generated by `clap` from the field attributes,
/// and can also be constructed programmatically via `Default`.
///
/// # Examples
///
/// ```bash
/// # Save every track of a text playlist to liked songs
/// playlist_import tracks.txt --target liked
///
/// # Append an iTunes export to an existing playlist with a smaller starting budget
/// playlist_import Library.xml --target playlist --playlist-id 37i9dQZF1DX --permits-per-period 20
///
/// # Find the id of an existing playlist
/// playlist_import --list-playlists
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "playlist_import",
    about = "Imports a playlist file into a music service under adaptive rate limiting."
)]
pub struct Config {
    /// Playlist file to import (.txt or iTunes library .xml)
    #[arg(value_parser, required_unless_present = "list_playlists")]
    pub file: Option<PathBuf>,

    /// List the user's playlists (name and id) instead of importing
    #[arg(long)]
    pub list_playlists: bool,

    /// Where resolved tracks go: liked|playlist
    #[arg(long, value_enum, default_value_t = ImportTarget::Liked)]
    pub target: ImportTarget,

    /// Existing playlist id (playlist target only; a new playlist is created if absent)
    #[arg(long)]
    pub playlist_id: Option<String>,

    /// Name for a newly created playlist (defaults to the file name without extension)
    #[arg(long)]
    pub playlist_name: Option<String>,

    /// Base URL of the remote music API
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// OAuth access token for the remote API
    #[arg(long, env = "MUSIC_API_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Initial permits per refill period (shrinks automatically on throttling)
    #[arg(long, default_value_t = DEFAULT_PERMITS_PER_PERIOD)]
    pub permits_per_period: u32,

    /// Refill period in milliseconds
    #[arg(long, default_value_t = DEFAULT_PERIOD_MS)]
    pub period_ms: u64,

    /// Longest wait for a permit in milliseconds before the call is rejected and retried
    #[arg(long, default_value_t = DEFAULT_GATE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Tracks resolved in parallel (defaults to the number of CPUs)
    #[arg(long, default_value_t = default_worker_concurrency())]
    pub worker_concurrency: usize,

    /// Wait in seconds after a throttling response without a Retry-After header
    #[arg(long, default_value_t = DEFAULT_RETRY_AFTER.as_secs())]
    pub default_retry_after_secs: u64,

    /// Per-HTTP-call timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Separator between track name and artist in plain-text playlists
    #[arg(long, default_value = DEFAULT_TXT_DELIMITER)]
    pub txt_delimiter: String,
}

impl Config {
    /// Builds the gateway tuning from the CLI values, clamping invalid ones.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            permits_per_period: self.permits_per_period,
            period: Duration::from_millis(self.period_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            worker_concurrency: self.worker_concurrency,
            default_retry_after: Duration::from_secs(self.default_retry_after_secs),
            ..GatewayConfig::default()
        }
        .sanitized()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            list_playlists: false,
            target: ImportTarget::Liked,
            playlist_id: None,
            playlist_name: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            permits_per_period: DEFAULT_PERMITS_PER_PERIOD,
            period_ms: DEFAULT_PERIOD_MS,
            timeout_ms: DEFAULT_GATE_TIMEOUT_MS,
            worker_concurrency: default_worker_concurrency(),
            default_retry_after_secs: DEFAULT_RETRY_AFTER.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            txt_delimiter: DEFAULT_TXT_DELIMITER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_gateway_config_defaults_match_reference_values() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.permits_per_period, 100);
        assert_eq!(cfg.period, Duration::from_millis(100));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.default_retry_after, Duration::from_secs(2));
        assert!(cfg.worker_concurrency >= 1);
    }

    #[test]
    fn test_gateway_config_sanitized_clamps_zero_values() {
        let cfg = GatewayConfig {
            permits_per_period: 0,
            period: Duration::ZERO,
            worker_concurrency: 0,
            breaker_failure_threshold: 0,
            ..GatewayConfig::default()
        }
        .sanitized();

        assert_eq!(cfg.permits_per_period, 1);
        assert_eq!(cfg.worker_concurrency, 1);
        assert_eq!(cfg.breaker_failure_threshold, 1);
        assert!(!cfg.period.is_zero());
    }

    #[test]
    fn test_config_gateway_config_uses_cli_values() {
        let config = Config {
            permits_per_period: 20,
            period_ms: 250,
            timeout_ms: 1_500,
            worker_concurrency: 8,
            default_retry_after_secs: 7,
            ..Default::default()
        };

        let gw = config.gateway_config();
        assert_eq!(gw.permits_per_period, 20);
        assert_eq!(gw.period, Duration::from_millis(250));
        assert_eq!(gw.timeout, Duration::from_millis(1_500));
        assert_eq!(gw.worker_concurrency, 8);
        assert_eq!(gw.default_retry_after, Duration::from_secs(7));
    }

    #[test]
    fn test_config_parses_minimal_command_line() {
        let config = Config::try_parse_from(["playlist_import", "songs.txt"])
            .expect("minimal command line should parse");
        assert_eq!(config.file, Some(PathBuf::from("songs.txt")));
        assert_eq!(config.target, ImportTarget::Liked);
        assert_eq!(config.permits_per_period, DEFAULT_PERMITS_PER_PERIOD);
        assert_eq!(config.txt_delimiter, DEFAULT_TXT_DELIMITER);
    }

    #[test]
    fn test_config_file_required_unless_listing() {
        assert!(Config::try_parse_from(["playlist_import"]).is_err());

        let config = Config::try_parse_from(["playlist_import", "--list-playlists"])
            .expect("listing needs no file");
        assert!(config.list_playlists);
        assert!(config.file.is_none());
    }
}
