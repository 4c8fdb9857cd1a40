//! Collaborator seams of the import pipeline.

use std::future::Future;

use crate::client::{track_uri, MusicApiClient};
use crate::config::{LIKED_SONGS_BATCH_SIZE, PLAYLIST_BATCH_SIZE};
use crate::error_handling::GatewayError;
use crate::models::Track;

/// Maps a parsed track to a remote id.
pub trait TrackResolver: Send + Sync + 'static {
    /// `Ok(None)` when the remote catalog has no match.
    fn resolve(&self, track: &Track)
        -> impl Future<Output = Result<Option<String>, GatewayError>> + Send;
}

/// Applies resolved ids to the import destination in fixed-size batches.
pub trait BatchApplier: Send + Sync {
    /// Largest batch the remote API accepts for this operation.
    fn batch_size(&self) -> usize;

    /// Applies one batch of at most `batch_size()` ids.
    fn apply_batch(&self, ids: &[String]) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

impl TrackResolver for MusicApiClient {
    async fn resolve(&self, track: &Track) -> Result<Option<String>, GatewayError> {
        self.search_track(track).await
    }
}

/// The user's liked songs.
pub struct LikedSongs {
    client: MusicApiClient,
}

impl LikedSongs {
    /// Liked-songs destination backed by `client`.
    pub fn new(client: MusicApiClient) -> Self {
        LikedSongs { client }
    }
}

impl BatchApplier for LikedSongs {
    fn batch_size(&self) -> usize {
        LIKED_SONGS_BATCH_SIZE
    }

    async fn apply_batch(&self, ids: &[String]) -> Result<(), GatewayError> {
        self.client.add_to_liked(ids).await
    }
}

/// An existing playlist; tracks are inserted at the top.
pub struct PlaylistTracks {
    client: MusicApiClient,
    playlist_id: String,
}

impl PlaylistTracks {
    /// Playlist destination backed by `client`.
    pub fn new(client: MusicApiClient, playlist_id: impl Into<String>) -> Self {
        PlaylistTracks {
            client,
            playlist_id: playlist_id.into(),
        }
    }

    /// Id of the target playlist.
    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }
}

impl BatchApplier for PlaylistTracks {
    fn batch_size(&self) -> usize {
        PLAYLIST_BATCH_SIZE
    }

    async fn apply_batch(&self, ids: &[String]) -> Result<(), GatewayError> {
        let uris: Vec<String> = ids.iter().map(|id| track_uri(id)).collect();
        self.client.add_to_playlist(&self.playlist_id, &uris).await
    }
}

/// Destination chosen at run time.
pub enum Destination {
    /// Liked songs
    Liked(LikedSongs),
    /// A playlist
    Playlist(PlaylistTracks),
}

impl BatchApplier for Destination {
    fn batch_size(&self) -> usize {
        match self {
            Destination::Liked(d) => d.batch_size(),
            Destination::Playlist(d) => d.batch_size(),
        }
    }

    async fn apply_batch(&self, ids: &[String]) -> Result<(), GatewayError> {
        match self {
            Destination::Liked(d) => d.apply_batch(ids).await,
            Destination::Playlist(d) => d.apply_batch(ids).await,
        }
    }
}
