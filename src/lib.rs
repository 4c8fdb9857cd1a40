//! playlist_import library: playlist import under adaptive rate limiting
//!
//! This library resolves the tracks of a playlist file against a remote music API and
//! saves them to the user's liked songs or to a playlist. Every outbound call goes
//! through a shared gateway that admits calls against a token-bucket budget, pauses all
//! traffic while the server is throttling, shrinks the budget on confirmed throttling,
//! and retries transient failures indefinitely.
//!
//! # Example
//!
//! ```no_run
//! use playlist_import::{run_import, Config, ImportTarget};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: Some(std::path::PathBuf::from("tracks.txt")),
//!     target: ImportTarget::Liked,
//!     access_token: Some("token".into()),
//!     worker_concurrency: 4,
//!     ..Default::default()
//! };
//!
//! let report = run_import(config).await?;
//! println!("Imported {} tracks, {} unresolved",
//!          report.resolved, report.unresolved.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod client;
pub mod config;
pub mod error_handling;
pub mod gateway;
pub mod importer;
pub mod initialization;
pub mod models;
pub mod parse;

// Re-export public API
pub use client::{MusicApiClient, PlaylistSummary};
pub use config::{Config, GatewayConfig, ImportTarget, LogFormat, LogLevel};
pub use error_handling::{GatewayError, ImportError};
pub use gateway::{BreakerState, Gateway, RateBudget};
pub use models::Track;
pub use run::{list_playlists, run_import, run_import_with_cancel, ImportReport};

// Internal run module (contains the top-level import flow)
mod run {
    use anyhow::{Context, Result};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Instant;

    use log::info;
    use tokio::time::{interval, Duration};
    use tokio_util::sync::CancellationToken;

    use crate::app::{log_progress, print_budget_summary, print_error_statistics, shutdown_gracefully};
    use crate::client::{MusicApiClient, PlaylistSummary};
    use crate::config::{Config, ImportTarget, LOGGING_INTERVAL};
    use crate::error_handling::{ImportError, ProcessingStats};
    use crate::importer::{
        import_tracks, Destination, LikedSongs, PlaylistTracks, ResolveProgress,
    };
    use crate::initialization::{init_client, init_gateway};
    use crate::models::Track;
    use crate::parse::parse_playlist_file;

    /// Results of an import run.
    #[derive(Debug, Clone)]
    pub struct ImportReport {
        /// `true` when every bulk-apply batch succeeded
        pub success: bool,
        /// Number of tracks matched and applied
        pub resolved: usize,
        /// Tracks that could not be matched, in playlist order
        pub unresolved: Vec<Track>,
        /// Number of bulk-apply batches issued
        pub batches: usize,
        /// Playlist the tracks went to (`None` for liked songs)
        pub playlist_id: Option<String>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    fn build_client(config: &Config) -> Result<MusicApiClient> {
        let token = config
            .access_token
            .clone()
            .context("No access token: pass --access-token or set MUSIC_API_TOKEN")?;
        let stats = Arc::new(ProcessingStats::new());
        let gateway = init_gateway(config, stats);
        let http = init_client(config).context("Failed to initialize HTTP client")?;
        MusicApiClient::new(http, &config.api_base_url, token, gateway)
            .context("Failed to initialize API client")
    }

    fn playlist_name(config: &Config, file: &Path) -> Result<String, ImportError> {
        config
            .playlist_name
            .clone()
            .or_else(|| {
                file.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .filter(|name| !name.trim().is_empty())
            .ok_or(ImportError::MissingPlaylistName)
    }

    async fn destination(
        config: &Config,
        client: &MusicApiClient,
        file: &Path,
    ) -> Result<Destination, ImportError> {
        match config.target {
            ImportTarget::Liked => Ok(Destination::Liked(LikedSongs::new(client.clone()))),
            ImportTarget::Playlist => {
                let playlist_id = match &config.playlist_id {
                    Some(id) => id.clone(),
                    None => {
                        let name = playlist_name(config, file)?;
                        let user_id = client.current_user_id().await?;
                        client.create_playlist(&user_id, &name).await?
                    }
                };
                Ok(Destination::Playlist(PlaylistTracks::new(
                    client.clone(),
                    playlist_id,
                )))
            }
        }
    }

    /// Runs an import with the provided configuration.
    ///
    /// This is the main entry point for the library. It parses the playlist file,
    /// resolves every track through the gateway, and applies the matches to the
    /// configured destination.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The playlist file cannot be read or has no usable tracks
    /// - No access token is configured
    /// - A new playlist is needed but cannot be created
    pub async fn run_import(config: Config) -> Result<ImportReport> {
        run_import_with_cancel(config, CancellationToken::new()).await
    }

    /// Same as [`run_import`], stopping early once `cancel` fires.
    ///
    /// A cancelled run fails with `ImportError::Cancelled`; calls already sent to the
    /// remote API are not rolled back.
    pub async fn run_import_with_cancel(
        config: Config,
        cancel: CancellationToken,
    ) -> Result<ImportReport> {
        let start_time = Instant::now();
        let file = config
            .file
            .clone()
            .context("No playlist file given")?;

        let tracks = parse_playlist_file(&file, &config.txt_delimiter)
            .with_context(|| format!("Failed to parse playlist {}", file.display()))?;
        info!("Parsed {} tracks from {}", tracks.len(), file.display());

        let client = build_client(&config)?;
        let gateway = Arc::clone(client.gateway());
        let gateway_config = config.gateway_config();

        let destination = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ImportError::Cancelled),
            prepared = destination(&config, &client, &file) => prepared,
        }
        .context("Failed to prepare import destination")?;
        let playlist_id = match &destination {
            Destination::Playlist(p) => Some(p.playlist_id().to_string()),
            Destination::Liked(_) => None,
        };

        let total = tracks.len();
        let progress = Arc::new(ResolveProgress::default());
        let logging_cancel = CancellationToken::new();
        let logging_task = {
            let progress = Arc::clone(&progress);
            let cancel = logging_cancel.clone();
            tokio::spawn(async move {
                let mut ticker = interval(Duration::from_secs(LOGGING_INTERVAL));
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => log_progress(start_time, total, &progress),
                    }
                }
            })
        };

        let result = import_tracks(
            Arc::new(client),
            &destination,
            tracks,
            gateway_config.worker_concurrency,
            &cancel,
            gateway.stats(),
            Arc::clone(&progress),
        )
        .await;

        shutdown_gracefully(logging_cancel, Some(logging_task)).await;
        print_error_statistics(gateway.stats());
        print_budget_summary(gateway_config.permits_per_period, &gateway.budget().await);

        let result = result.context("Import did not complete")?;
        Ok(ImportReport {
            success: result.success,
            resolved: result.resolved_ids.len(),
            unresolved: result.unresolved,
            batches: result.batches.batches,
            playlist_id,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Lists the first page of the user's playlists.
    ///
    /// # Errors
    ///
    /// Returns an error if no access token is configured or the listing call fails.
    pub async fn list_playlists(config: Config) -> Result<Vec<PlaylistSummary>> {
        let client = build_client(&config)?;
        client
            .user_playlists()
            .await
            .context("Failed to list playlists")
    }
}
