//! # Spotify Integration Module
//!
//! Everything fangirl needs from the Spotify Web API, behind one seam.
//!
//! ```text
//! pipeline (ingest, filter, playlist)
//!          ↓
//! retry::RetryingClient   -- bounded retry with a fixed delay
//!          ↓
//! SpotifyApi (trait)      -- SpotifyClient over HTTP, fakes in tests
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Operations
//!
//! - `GET /me` - the current user, owner of the created playlist
//! - `GET /me/following?type=artist` - followed artists, cursor paginated
//! - `GET /artists/{id}/albums` - an artist's releases for a market and set of groups
//! - `GET /me/albums` - the user's saved albums
//! - `GET /albums/{id}/tracks` - an album's track listing
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{id}/tracks` - add up to 100 tracks
//!
//! Offset paginated listings all share [`Page`], so a single
//! [`SpotifyApi::next_page`] advances any of them. Reaching the end is `Ok(None)`,
//! not an error.
//!
//! ## Errors
//!
//! Non-success statuses become [`Error::Api`], transport failures
//! [`Error::Http`]. Neither is handled here; the retry layer treats all of
//! them alike.

pub mod auth;
pub mod retry;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    Res, config,
    error::Error,
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, Album, AlbumGroup, Artist,
        CreatePlaylistRequest, CursorPage, FollowedArtistsResponse, Page, Playlist, SavedAlbum,
        Track, User,
    },
};

/// Largest page size accepted by the listings used here.
pub const PAGE_LIMIT: u32 = 50;

/// Largest number of tracks a single add-tracks call accepts.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// The remote operations the pipeline is built on.
#[allow(async_fn_in_trait)]
pub trait SpotifyApi {
    async fn current_user(&self) -> Res<User>;

    async fn followed_artists(&self, after: Option<&str>) -> Res<CursorPage<Artist>>;

    async fn artist_albums(
        &self,
        artist_id: &str,
        market: &str,
        groups: &[AlbumGroup],
    ) -> Res<Page<Album>>;

    async fn saved_albums(&self) -> Res<Page<SavedAlbum>>;

    async fn album_tracks(&self, album_id: &str) -> Res<Page<Track>>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Res<Playlist>;

    /// Returns the snapshot id of the modified playlist.
    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<String>;

    /// Fetches the page following `page`, or `None` if `page` is the last one.
    async fn next_page<T>(&self, page: &Page<T>) -> Res<Option<Page<T>>>
    where
        T: DeserializeOwned;
}

/// [`SpotifyApi`] over HTTP with a bearer token that is refreshed on demand.
#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self::with_api_url(tokens, config::spotify_apiurl())
    }

    pub fn with_api_url(tokens: TokenManager, api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Res<Response> {
        let token = self.tokens.lock().await.get_valid_token().await;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Res<T> {
        debug!("GET {} {:?}", url, query);
        let response = self.send(self.http.get(url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Res<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self.send(self.http.post(url).json(body)).await?;
        Ok(response.json::<T>().await?)
    }
}

impl SpotifyApi for SpotifyClient {
    async fn current_user(&self) -> Res<User> {
        self.get(&format!("{}/me", self.api_url), &[]).await
    }

    async fn followed_artists(&self, after: Option<&str>) -> Res<CursorPage<Artist>> {
        let limit = PAGE_LIMIT.to_string();
        let mut query = vec![("type", "artist"), ("limit", limit.as_str())];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let res: FollowedArtistsResponse = self
            .get(&format!("{}/me/following", self.api_url), &query)
            .await?;
        Ok(res.artists)
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        market: &str,
        groups: &[AlbumGroup],
    ) -> Res<Page<Album>> {
        let include_groups = AlbumGroup::join(groups);
        let limit = PAGE_LIMIT.to_string();
        self.get(
            &format!("{}/artists/{}/albums", self.api_url, artist_id),
            &[
                ("include_groups", include_groups.as_str()),
                ("market", market),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }

    async fn saved_albums(&self) -> Res<Page<SavedAlbum>> {
        let limit = PAGE_LIMIT.to_string();
        self.get(
            &format!("{}/me/albums", self.api_url),
            &[("limit", limit.as_str())],
        )
        .await
    }

    async fn album_tracks(&self, album_id: &str) -> Res<Page<Track>> {
        let limit = PAGE_LIMIT.to_string();
        self.get(
            &format!("{}/albums/{}/tracks", self.api_url, album_id),
            &[("limit", limit.as_str())],
        )
        .await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Res<Playlist> {
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        };
        self.post(
            &format!("{}/users/{}/playlists", self.api_url, user_id),
            &request,
        )
        .await
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<String> {
        if uris.len() > MAX_TRACKS_PER_REQUEST {
            return Err(Error::config(format!(
                "cannot add {} tracks at once, the limit is {}",
                uris.len(),
                MAX_TRACKS_PER_REQUEST
            )));
        }

        let request = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let res: AddTrackToPlaylistResponse = self
            .post(
                &format!("{}/playlists/{}/tracks", self.api_url, playlist_id),
                &request,
            )
            .await?;
        Ok(res.snapshot_id)
    }

    async fn next_page<T>(&self, page: &Page<T>) -> Res<Option<Page<T>>>
    where
        T: DeserializeOwned,
    {
        match page.next.as_deref() {
            Some(url) => self.get(url, &[]).await.map(Some),
            None => Ok(None),
        }
    }
}
