//! Bounded retry around every Spotify call.
//!
//! Runs of fangirl take hours and issue thousands of requests, so the odd
//! 502 or 429 is a certainty rather than an exception. Every failure is
//! retried the same way: wait a fixed delay, try again, give up after
//! `max_attempts` retries and hand the last error to the caller.
//!
//! There is no jitter and no backoff. `max_attempts * delay` is sized to
//! outlast a typical outage (60 x 30s by default).

use std::{fmt::Display, future::Future, time::Duration};

use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    Res,
    error::Error,
    spotify::{MAX_TRACKS_PER_REQUEST, SpotifyApi},
    types::{Album, AlbumGroup, Artist, CursorPage, Page, Playlist, SavedAlbum, Track, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts retries after the first try, so an operation is
    /// invoked at most `max_attempts + 1` times.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it succeeds or the retries are used up.
    ///
    /// The delay is awaited inline, suspending the calling flow; nothing else
    /// is issued in the meantime. On exhaustion the error of the last attempt
    /// is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(what, retries, "succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(err) if retries < self.max_attempts => {
                    retries += 1;
                    warn!(
                        what,
                        attempt = retries,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "call failed, retrying in {:?}",
                        self.delay
                    );
                    sleep(self.delay).await;
                }
                Err(err) => {
                    warn!(what, error = %err, "giving up after {} retries", retries);
                    return Err(err);
                }
            }
        }
    }
}

/// The only way the pipeline talks to Spotify: each operation of the wrapped
/// [`SpotifyApi`] goes through the [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryingClient<A> {
    api: A,
    policy: RetryPolicy,
}

impl<A: SpotifyApi> RetryingClient<A> {
    pub fn new(api: A, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &A {
        &self.api
    }

    pub async fn current_user(&self) -> Res<User> {
        self.policy
            .run("current user", || self.api.current_user())
            .await
    }

    pub async fn followed_artists(&self, after: Option<&str>) -> Res<CursorPage<Artist>> {
        self.policy
            .run("followed artists", || self.api.followed_artists(after))
            .await
    }

    pub async fn artist_albums(
        &self,
        artist_id: &str,
        market: &str,
        groups: &[AlbumGroup],
    ) -> Res<Page<Album>> {
        self.policy
            .run("artist albums", || {
                self.api.artist_albums(artist_id, market, groups)
            })
            .await
    }

    pub async fn saved_albums(&self) -> Res<Page<SavedAlbum>> {
        self.policy
            .run("saved albums", || self.api.saved_albums())
            .await
    }

    pub async fn album_tracks(&self, album_id: &str) -> Res<Page<Track>> {
        self.policy
            .run("album tracks", || self.api.album_tracks(album_id))
            .await
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Res<Playlist> {
        self.policy
            .run("create playlist", || {
                self.api.create_playlist(user_id, name, description, public)
            })
            .await
    }

    /// More than [`MAX_TRACKS_PER_REQUEST`] uris is rejected up front; no
    /// retry could make such a call succeed.
    pub async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<String> {
        if uris.len() > MAX_TRACKS_PER_REQUEST {
            return Err(Error::config(format!(
                "cannot add {} tracks at once, the limit is {}",
                uris.len(),
                MAX_TRACKS_PER_REQUEST
            )));
        }

        self.policy
            .run("add tracks", || self.api.add_tracks(playlist_id, uris))
            .await
    }

    /// Advances any offset paginated listing. `Ok(None)` marks the end and is
    /// never retried.
    pub async fn next_page<T>(&self, page: &Page<T>) -> Res<Option<Page<T>>>
    where
        T: DeserializeOwned,
    {
        self.policy
            .run("next page", || self.api.next_page(page))
            .await
    }
}
