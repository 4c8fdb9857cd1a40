//! Remote music API client.
//!
//! Every method issues its HTTP call through the shared [`Gateway`], so all callers are
//! subject to the same budget, breaker and retry policy.

mod response;
mod types;

use std::sync::Arc;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{PLAYLIST_PAGE_LIMIT, TRACK_URI_PREFIX};
use crate::error_handling::{GatewayError, InitializationError};
use crate::gateway::Gateway;
use crate::models::Track;

pub use response::{classify, parse_retry_after, status_error, transport_error};
pub use types::PlaylistSummary;
use types::{AddTracksRequest, CreatePlaylistRequest, Paging, SearchResponse, UserProfile};

/// Turns a remote track id into a playlist item uri.
pub fn track_uri(id: &str) -> String {
    format!("{}{}", TRACK_URI_PREFIX, id)
}

/// Authenticated client for the remote music API.
#[derive(Clone)]
pub struct MusicApiClient {
    http: Arc<reqwest::Client>,
    base_url: Url,
    access_token: String,
    gateway: Arc<Gateway>,
}

impl MusicApiClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::InvalidBaseUrlError` if `base_url` is not an
    /// absolute URL.
    pub fn new(
        http: Arc<reqwest::Client>,
        base_url: &str,
        access_token: impl Into<String>,
        gateway: Arc<Gateway>,
    ) -> Result<Self, InitializationError> {
        // Endpoints are joined as relative paths, so the base must end in a slash
        // for a path prefix (e.g. behind a proxy) to survive the join.
        let with_slash = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&with_slash)
            .map_err(|_| InitializationError::InvalidBaseUrlError(base_url.to_string()))?;
        Ok(MusicApiClient {
            http,
            base_url,
            access_token: access_token.into(),
            gateway,
        })
    }

    /// The gateway this client sends through.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::ClientError {
                status: 0,
                message: format!("invalid endpoint {}: {}", path, e),
            })
    }

    /// Sends one attempt of a request and classifies the response.
    async fn send_once<B>(&self, label: &str, build: &B) -> Result<reqwest::Response, GatewayError>
    where
        B: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let response = build(&self.http)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(transport_error)?;
        classify(response, label).await
    }

    /// Runs a request through the gateway and decodes its JSON body.
    async fn request_json<T, B>(&self, label: &str, build: B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let build = &build;
        self.gateway
            .execute(label, move || async move {
                self.send_once(label, build)
                    .await?
                    .json::<T>()
                    .await
                    .map_err(|e| GatewayError::Decode(e.to_string()))
            })
            .await
    }

    /// Runs a request through the gateway, ignoring the body of a 2xx response.
    async fn request_ok<B>(&self, label: &str, build: B) -> Result<(), GatewayError>
    where
        B: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let build = &build;
        self.gateway
            .execute(label, move || async move {
                self.send_once(label, build).await.map(|_| ())
            })
            .await
    }

    /// Looks up the best match for `track`. `Ok(None)` when the search has no hits.
    pub async fn search_track(&self, track: &Track) -> Result<Option<String>, GatewayError> {
        let url = self.endpoint("v1/search")?;
        let query = track.search_query();
        log::debug!("Searching for {}", query);

        let label = format!("search '{}'", query);
        let response: SearchResponse = self
            .request_json(&label, |http| {
                http.get(url.clone()).query(&[
                    ("q", query.as_str()),
                    ("type", "track"),
                    ("limit", "1"),
                ])
            })
            .await?;

        let hit = response
            .tracks
            .and_then(|page| page.items.into_iter().next());
        if let Some(found) = &hit {
            log::debug!(
                "Found {} for {}",
                found.id,
                found.name.as_deref().unwrap_or(&query)
            );
        }
        Ok(hit.map(|t| t.id))
    }

    /// Saves `ids` to the user's liked songs (at most 50 per call).
    pub async fn add_to_liked(&self, ids: &[String]) -> Result<(), GatewayError> {
        let url = self.endpoint("v1/me/tracks")?;
        let joined = ids.join(",");
        self.request_ok(&format!("save {} liked tracks", ids.len()), |http| {
            http.put(url.clone()).query(&[("ids", joined.as_str())])
        })
        .await
    }

    /// Inserts `uris` at the top of playlist `playlist_id` (at most 100 per call).
    pub async fn add_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&format!("v1/playlists/{}/tracks", playlist_id))?;
        let body = AddTracksRequest { uris };
        self.request_ok(
            &format!("add {} tracks to playlist {}", uris.len(), playlist_id),
            |http| http.post(url.clone()).query(&[("position", "0")]).json(&body),
        )
        .await
    }

    /// Id of the authenticated user.
    pub async fn current_user_id(&self) -> Result<String, GatewayError> {
        let url = self.endpoint("v1/me")?;
        let profile: UserProfile = self
            .request_json("current user", |http| http.get(url.clone()))
            .await?;
        Ok(profile.id)
    }

    /// Creates a private playlist named `name` for `user_id` and returns its id.
    pub async fn create_playlist(&self, user_id: &str, name: &str) -> Result<String, GatewayError> {
        let url = self.endpoint(&format!("v1/users/{}/playlists", user_id))?;
        let body = CreatePlaylistRequest {
            name,
            public: false,
        };
        let created: PlaylistSummary = self
            .request_json(&format!("create playlist '{}'", name), |http| {
                http.post(url.clone()).json(&body)
            })
            .await?;
        log::info!("Created playlist '{}' ({})", created.name, created.id);
        Ok(created.id)
    }

    /// First page of the user's playlists.
    pub async fn user_playlists(&self) -> Result<Vec<PlaylistSummary>, GatewayError> {
        let url = self.endpoint("v1/me/playlists")?;
        let limit = PLAYLIST_PAGE_LIMIT.to_string();
        let page: Paging<PlaylistSummary> = self
            .request_json("list playlists", |http| {
                http.get(url.clone()).query(&[("limit", limit.as_str())])
            })
            .await?;
        if page.next.is_some() {
            log::debug!(
                "More than {} playlists; only the first page is listed",
                PLAYLIST_PAGE_LIMIT
            );
        }
        Ok(page.items)
    }
}
