//! Integration tests for run_import against a mock music API.
//!
//! These tests verify the end-to-end import flow:
//! - Track resolution through the gateway (hits, misses, 404s, throttling)
//! - Bulk apply to liked songs and to playlists, including batch splitting
//! - Playlist creation when no playlist id is given
//! - Resubmitting the same import

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use playlist_import::{
    list_playlists, run_import, run_import_with_cancel, Config, ImportError, ImportTarget,
    LogFormat, LogLevel, Track,
};
use tokio_util::sync::CancellationToken;

/// Search endpoint that derives a track id from the query.
///
/// Queries starting with "Unknown" have no hits; queries starting with "Broken" are
/// answered with 404.
struct Catalog;

impl Respond for Catalog {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        if query.starts_with("Unknown") {
            ResponseTemplate::new(200).set_body_json(json!({ "tracks": { "items": [] } }))
        } else if query.starts_with("Broken") {
            ResponseTemplate::new(404).set_body_string("not found")
        } else {
            ResponseTemplate::new(200).set_body_json(json!({
                "tracks": { "items": [ { "id": query.replace(' ', "_"), "name": query } ] }
            }))
        }
    }
}

/// Helper function to write playlist lines to a temporary .txt file
fn write_playlist(lines: &[String]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write line");
    }
    file.flush().expect("Failed to flush file");
    file
}

/// Helper function to create a Config pointed at the mock server
fn create_test_config(file: &Path, server: &MockServer, target: ImportTarget) -> Config {
    Config {
        file: Some(file.to_path_buf()),
        target,
        api_base_url: server.uri(),
        access_token: Some("test-token".to_string()),
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
        worker_concurrency: 4,
        request_timeout_secs: 5,
        ..Default::default()
    }
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(Catalog)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}

#[tokio::test]
async fn test_import_to_liked_songs() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .and(query_param("ids", "Song_1_Band,Song_2_Band"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_playlist(&[
        "Song 1 - Band".to_string(),
        "Unknown Song - Nobody".to_string(),
        "".to_string(),
        "Song 2 - Band".to_string(),
    ]);
    let config = create_test_config(file.path(), &server, ImportTarget::Liked);

    let report = run_import(config).await.expect("import should succeed");

    assert!(report.success);
    assert_eq!(report.resolved, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(report.unresolved, vec![Track::new("Unknown Song", "Nobody")]);
    assert_eq!(report.playlist_id, None);

    let searches = requests_to(&server, "/v1/search").await;
    assert_eq!(searches.len(), 3);
    assert!(searches.iter().all(|r| {
        r.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer test-token")
    }));
}

#[tokio::test]
async fn test_throttled_search_is_retried_after_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_playlist(&["Song 1 - Band".to_string()]);
    let config = create_test_config(file.path(), &server, ImportTarget::Liked);

    let report = run_import(config).await.expect("import should succeed");

    assert!(report.success);
    assert_eq!(report.resolved, 1);
    assert!(report.unresolved.is_empty());
    assert_eq!(requests_to(&server, "/v1/search").await.len(), 2);
}

#[tokio::test]
async fn test_search_client_error_marks_track_unresolved() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .and(query_param("ids", "Song_1_Band"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_playlist(&[
        "Broken Song - Band".to_string(),
        "Song 1 - Band".to_string(),
    ]);
    let config = create_test_config(file.path(), &server, ImportTarget::Liked);

    let report = run_import(config).await.expect("import should succeed");

    assert!(report.success, "a failed search does not fail the import");
    assert_eq!(report.resolved, 1);
    assert_eq!(report.unresolved, vec![Track::new("Broken Song", "Band")]);
    // 404 is terminal: searched exactly once
    let broken = requests_to(&server, "/v1/search")
        .await
        .into_iter()
        .filter(|r| r.url.query().unwrap_or_default().contains("Broken"))
        .count();
    assert_eq!(broken, 1);
}

#[tokio::test]
async fn test_playlist_import_splits_into_batches_of_100() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/playlists/pl1/tracks"))
        .and(query_param("position", "0"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s" })))
        .expect(2)
        .mount(&server)
        .await;

    let lines: Vec<String> = (0..150).map(|i| format!("Song {} - Band", i)).collect();
    let file = write_playlist(&lines);
    let mut config = create_test_config(file.path(), &server, ImportTarget::Playlist);
    config.playlist_id = Some("pl1".to_string());

    let report = run_import(config).await.expect("import should succeed");

    assert!(report.success);
    assert_eq!(report.resolved, 150);
    assert_eq!(report.batches, 2);
    assert_eq!(report.playlist_id.as_deref(), Some("pl1"));

    let adds = requests_to(&server, "/v1/playlists/pl1/tracks").await;
    let sizes: Vec<usize> = adds
        .iter()
        .map(|r| {
            let body: Value = r.body_json().expect("body should be JSON");
            body["uris"].as_array().map(Vec::len).unwrap_or(0)
        })
        .collect();
    assert_eq!(sizes, vec![100, 50]);

    let first: Value = adds[0].body_json().expect("body should be JSON");
    assert_eq!(first["uris"][0], "spotify:track:Song_0_Band");
}

#[tokio::test]
async fn test_playlist_is_created_from_file_name() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/users/user1/playlists"))
        .and(body_json(json!({ "name": "road_trip", "public": false })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "newpl", "name": "road_trip" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/playlists/newpl/tracks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let file: PathBuf = dir.path().join("road_trip.txt");
    std::fs::write(&file, "Song 1 - Band\n").expect("Failed to write playlist");
    let config = create_test_config(&file, &server, ImportTarget::Playlist);

    let report = run_import(config).await.expect("import should succeed");

    assert!(report.success);
    assert_eq!(report.playlist_id.as_deref(), Some("newpl"));
}

#[tokio::test]
async fn test_cancel_stops_playlist_setup_against_failing_api() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let file = write_playlist(&["Song 1 - Band".to_string()]);
    let config = create_test_config(file.path(), &server, ImportTarget::Playlist);
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            cancel.cancel();
        });
    }

    let err = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        run_import_with_cancel(config, cancel),
    )
    .await
    .expect("cancellation must end the run")
    .expect_err("a cancelled run is an error");

    assert!(matches!(
        err.downcast_ref::<ImportError>(),
        Some(ImportError::Cancelled)
    ));
    assert!(requests_to(&server, "/v1/search").await.is_empty());
}

#[tokio::test]
async fn test_rejected_batch_fails_the_import() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad ids"))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_playlist(&["Song 1 - Band".to_string()]);
    let config = create_test_config(file.path(), &server, ImportTarget::Liked);

    let report = run_import(config).await.expect("run completes");

    assert!(!report.success);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.batches, 1);
}

#[tokio::test]
async fn test_resubmitting_an_import_gives_the_same_outcome() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .and(query_param("ids", "Song_1_Band,Song_2_Band"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let file = write_playlist(&["Song 1 - Band".to_string(), "Song 2 - Band".to_string()]);

    let first = run_import(create_test_config(file.path(), &server, ImportTarget::Liked))
        .await
        .expect("first import should succeed");
    let second = run_import(create_test_config(file.path(), &server, ImportTarget::Liked))
        .await
        .expect("second import should succeed");

    assert!(first.success && second.success);
    assert_eq!(first.resolved, second.resolved);
    assert_eq!(first.batches, second.batches);
    assert_eq!(first.unresolved, second.unresolved);
}

#[tokio::test]
async fn test_missing_access_token_is_an_error() {
    let server = MockServer::start().await;
    let file = write_playlist(&["Song 1 - Band".to_string()]);
    let mut config = create_test_config(file.path(), &server, ImportTarget::Liked);
    config.access_token = None;

    let err = run_import(config).await.expect_err("token is required");
    assert!(format!("{:#}", err).contains("access token"));
}

#[tokio::test]
async fn test_unsupported_file_is_an_error() {
    let server = MockServer::start().await;
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(file, "Song,Band").expect("Failed to write line");
    let config = create_test_config(file.path(), &server, ImportTarget::Liked);

    assert!(run_import(config).await.is_err());
    assert!(requests_to(&server, "/v1/search").await.is_empty());
}

#[tokio::test]
async fn test_list_playlists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "a1", "name": "Morning" },
                { "id": "b2", "name": "Evening" }
            ],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        list_playlists: true,
        api_base_url: server.uri(),
        access_token: Some("test-token".to_string()),
        ..Default::default()
    };

    let playlists = list_playlists(config).await.expect("listing should succeed");
    let names: Vec<&str> = playlists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Morning", "Evening"]);
    assert_eq!(playlists[0].id, "a1");
}
