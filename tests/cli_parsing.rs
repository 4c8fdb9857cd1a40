//! Tests for command-line parsing of the import options.

use clap::Parser;
use playlist_import::config::{
    Config, ImportTarget, LogFormat, LogLevel, DEFAULT_API_BASE_URL, DEFAULT_PERMITS_PER_PERIOD,
    DEFAULT_TXT_DELIMITER,
};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = Config::try_parse_from(["playlist_import", "songs.txt"]).unwrap();

    assert_eq!(config.file, Some(PathBuf::from("songs.txt")));
    assert_eq!(config.target, ImportTarget::Liked);
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.permits_per_period, DEFAULT_PERMITS_PER_PERIOD);
    assert_eq!(config.period_ms, 100);
    assert_eq!(config.timeout_ms, 5_000);
    assert_eq!(config.default_retry_after_secs, 2);
    assert_eq!(config.txt_delimiter, DEFAULT_TXT_DELIMITER);
    assert!(config.worker_concurrency >= 1);
    assert!(!config.list_playlists);
    assert!(matches!(config.log_level, LogLevel::Info));
    assert!(matches!(config.log_format, LogFormat::Plain));
}

#[test]
fn test_playlist_target_with_gateway_tuning() {
    let config = Config::try_parse_from([
        "playlist_import",
        "Library.xml",
        "--target",
        "playlist",
        "--playlist-id",
        "37i9dQZF1DX",
        "--permits-per-period",
        "20",
        "--period-ms",
        "1000",
        "--timeout-ms",
        "2500",
        "--worker-concurrency",
        "8",
        "--log-format",
        "json",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(config.target, ImportTarget::Playlist);
    assert_eq!(config.playlist_id.as_deref(), Some("37i9dQZF1DX"));
    assert!(matches!(config.log_format, LogFormat::Json));
    assert!(matches!(config.log_level, LogLevel::Debug));

    let gateway = config.gateway_config();
    assert_eq!(gateway.permits_per_period, 20);
    assert_eq!(gateway.period, Duration::from_secs(1));
    assert_eq!(gateway.timeout, Duration::from_millis(2_500));
    assert_eq!(gateway.worker_concurrency, 8);
}

#[test]
fn test_zero_values_are_clamped_in_gateway_config() {
    let config = Config::try_parse_from([
        "playlist_import",
        "songs.txt",
        "--permits-per-period",
        "0",
        "--worker-concurrency",
        "0",
        "--period-ms",
        "0",
    ])
    .unwrap();

    let gateway = config.gateway_config();
    assert_eq!(gateway.permits_per_period, 1);
    assert_eq!(gateway.worker_concurrency, 1);
    assert!(!gateway.period.is_zero());
}

#[test]
fn test_list_playlists_needs_no_file() {
    let config = Config::try_parse_from(["playlist_import", "--list-playlists"]).unwrap();
    assert!(config.list_playlists);
    assert_eq!(config.file, None);
}

#[test]
fn test_file_is_required_for_import() {
    assert!(Config::try_parse_from(["playlist_import"]).is_err());
}

#[test]
fn test_invalid_target_is_rejected() {
    let result = Config::try_parse_from(["playlist_import", "songs.txt", "--target", "album"]);
    assert!(result.is_err());
}

#[test]
fn test_custom_delimiter_and_playlist_name() {
    let config = Config::try_parse_from([
        "playlist_import",
        "songs.txt",
        "--txt-delimiter",
        " | ",
        "--target",
        "playlist",
        "--playlist-name",
        "Road Trip",
    ])
    .unwrap();

    assert_eq!(config.txt_delimiter, " | ");
    assert_eq!(config.playlist_name.as_deref(), Some("Road Trip"));
    assert_eq!(config.playlist_id, None);
}
