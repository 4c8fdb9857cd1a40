//! Wire types of the remote music API.

use serde::{Deserialize, Serialize};

/// A page of results.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    /// Items on this page
    #[serde(default)]
    pub items: Vec<T>,
    /// URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,
}

/// `GET /v1/search` response (track search only).
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Matching tracks, absent when nothing matched
    #[serde(default)]
    pub tracks: Option<Paging<TrackObject>>,
}

/// A track as returned by search.
#[derive(Debug, Deserialize)]
pub struct TrackObject {
    /// Remote track id
    pub id: String,
    /// Title, for logging
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /v1/me` response.
#[derive(Debug, Deserialize)]
pub struct UserProfile {
    /// Remote user id
    pub id: String,
}

/// A playlist owned or followed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistSummary {
    /// Remote playlist id
    pub id: String,
    /// Display name
    pub name: String,
}

/// `POST /v1/users/{user}/playlists` body.
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    /// Name of the new playlist
    pub name: &'a str,
    /// Whether the playlist is publicly listed
    pub public: bool,
}

/// `POST /v1/playlists/{id}/tracks` body.
#[derive(Debug, Serialize)]
pub struct AddTracksRequest<'a> {
    /// Track uris to insert
    pub uris: &'a [String],
}
