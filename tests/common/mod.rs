#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    time::Duration,
};

use chrono::{TimeDelta, Utc};
use fangirl::{
    Res,
    config::Settings,
    error::Error,
    spotify::{
        SpotifyApi,
        retry::{RetryPolicy, RetryingClient},
    },
    types::{
        Album, AlbumArtist, AlbumGroup, Artist, CursorPage, Cursors, Page, Playlist, SavedAlbum,
        Track, User,
    },
};
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};

/// In-memory stand-in for the Spotify Web API.
///
/// Listings are cut into pages of `page_size`; follow-up pages are stored as
/// JSON under a fake `next` URL, so one `next_page` serves every item type.
/// `fail_next(n)` makes the next `n` calls of any kind fail with a 502.
pub struct FakeSpotify {
    pub user_id: String,
    pub followed: Vec<Artist>,
    /// Overrides the reported total of followed artists.
    pub followed_total: Option<u64>,
    /// Leaves `total` out of the followed artists listing.
    pub report_total: bool,
    pub artist_albums: HashMap<String, Vec<Album>>,
    pub saved: Vec<Album>,
    pub tracks: HashMap<String, Vec<Track>>,
    pub page_size: usize,
    failures: Cell<u32>,
    fail_from: Cell<Option<usize>>,
    pages: RefCell<HashMap<String, serde_json::Value>>,
    pub calls: RefCell<Vec<String>>,
    pub album_requests: RefCell<Vec<(String, String, String)>>,
    pub created: RefCell<Vec<(String, String, String, bool)>>,
    pub added: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self {
            user_id: "listener".to_string(),
            followed: Vec::new(),
            followed_total: None,
            report_total: true,
            artist_albums: HashMap::new(),
            saved: Vec::new(),
            tracks: HashMap::new(),
            page_size: 50,
            failures: Cell::new(0),
            fail_from: Cell::new(None),
            pages: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            album_requests: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            added: RefCell::new(Vec::new()),
        }
    }

    pub fn follow(&mut self, artist: Artist, albums: Vec<Album>) {
        self.artist_albums.insert(artist.id.clone(), albums);
        self.followed.push(artist);
    }

    pub fn fail_next(&self, n: u32) {
        self.failures.set(n);
    }

    /// Lets the next `n` calls through and fails every call after them.
    pub fn fail_after(&self, n: usize) {
        self.fail_from.set(Some(self.calls.borrow().len() + n));
    }

    pub fn calls_to(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.added.borrow().iter().map(|(_, uris)| uris.len()).collect()
    }

    fn call(&self, op: &str) -> Res<()> {
        self.calls.borrow_mut().push(op.to_string());
        let seen = self.calls.borrow().len();
        let remaining = self.failures.get();
        let broken = self.fail_from.get().is_some_and(|from| seen > from);
        if remaining > 0 || broken {
            self.failures.set(remaining.saturating_sub(1));
            return Err(Error::Api {
                status: StatusCode::BAD_GATEWAY,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn paginate<T: Serialize + Clone>(&self, key: &str, items: &[T]) -> Page<T> {
        let size = self.page_size.max(1);
        let chunks: Vec<&[T]> = items.chunks(size).collect();
        let url = |i: usize| format!("fake://{key}?page={i}");

        let page = |i: usize| Page {
            items: chunks.get(i).map(|c| c.to_vec()).unwrap_or_default(),
            next: (i + 1 < chunks.len()).then(|| url(i + 1)),
            total: items.len() as u64,
            offset: (i * size) as u64,
            limit: size as u64,
        };

        let mut pages = self.pages.borrow_mut();
        for i in 1..chunks.len() {
            let value = serde_json::to_value(page(i)).expect("page serializes");
            pages.insert(url(i), value);
        }
        page(0)
    }
}

impl SpotifyApi for FakeSpotify {
    async fn current_user(&self) -> Res<User> {
        self.call("current_user")?;
        Ok(User {
            id: self.user_id.clone(),
            display_name: None,
        })
    }

    async fn followed_artists(&self, after: Option<&str>) -> Res<CursorPage<Artist>> {
        self.call("followed_artists")?;
        let start: usize = after.map_or(0, |a| a.parse().expect("numeric cursor"));
        let end = (start + self.page_size).min(self.followed.len());
        let items = self.followed.get(start..end).unwrap_or_default().to_vec();

        Ok(CursorPage {
            items,
            next: None,
            cursors: Some(Cursors {
                after: (end < self.followed.len()).then(|| end.to_string()),
            }),
            total: self
                .report_total
                .then(|| self.followed_total.unwrap_or(self.followed.len() as u64)),
        })
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        market: &str,
        groups: &[AlbumGroup],
    ) -> Res<Page<Album>> {
        self.call("artist_albums")?;
        self.album_requests.borrow_mut().push((
            artist_id.to_string(),
            market.to_string(),
            AlbumGroup::join(groups),
        ));
        let albums = self
            .artist_albums
            .get(artist_id)
            .cloned()
            .unwrap_or_default();
        Ok(self.paginate(&format!("artists/{artist_id}/albums"), &albums))
    }

    async fn saved_albums(&self) -> Res<Page<SavedAlbum>> {
        self.call("saved_albums")?;
        let saved: Vec<SavedAlbum> = self
            .saved
            .iter()
            .map(|album| SavedAlbum {
                added_at: "2020-01-01T00:00:00Z".to_string(),
                album: album.clone(),
            })
            .collect();
        Ok(self.paginate("me/albums", &saved))
    }

    async fn album_tracks(&self, album_id: &str) -> Res<Page<Track>> {
        self.call("album_tracks")?;
        let tracks = self.tracks.get(album_id).cloned().unwrap_or_default();
        Ok(self.paginate(&format!("albums/{album_id}/tracks"), &tracks))
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Res<Playlist> {
        self.call("create_playlist")?;
        self.created.borrow_mut().push((
            user_id.to_string(),
            name.to_string(),
            description.to_string(),
            public,
        ));
        Ok(Playlist {
            id: "playlist-1".to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            public: Some(public),
            collaborative: false,
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<String> {
        self.call("add_tracks")?;
        assert!(uris.len() <= 100, "batch of {} tracks", uris.len());
        self.added
            .borrow_mut()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(format!("snapshot-{}", self.added.borrow().len()))
    }

    async fn next_page<T>(&self, page: &Page<T>) -> Res<Option<Page<T>>>
    where
        T: DeserializeOwned,
    {
        self.call("next_page")?;
        let Some(url) = page.next.as_deref() else {
            return Ok(None);
        };
        let value = self
            .pages
            .borrow()
            .get(url)
            .cloned()
            .expect("next page registered");
        Ok(Some(serde_json::from_value(value)?))
    }
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: Vec::new(),
    }
}

/// `ar<n>` named `Artist <n>`.
pub fn numbered_artist(n: usize) -> Artist {
    artist(&format!("ar{n}"), &format!("Artist {n}"))
}

pub fn album(id: &str, artist_name: &str, release_date: &str) -> Album {
    Album {
        id: id.to_string(),
        name: format!("Album {id}"),
        release_date: release_date.to_string(),
        release_date_precision: "day".to_string(),
        album_type: "album".to_string(),
        artists: vec![AlbumArtist {
            id: format!("{artist_name}_id"),
            name: artist_name.to_string(),
        }],
    }
}

pub fn tracks(album_id: &str, count: usize) -> Vec<Track> {
    (0..count)
        .map(|n| Track {
            id: format!("{album_id}-{n}"),
            name: format!("Track {n}"),
            uri: format!("spotify:track:{album_id}-{n}"),
        })
        .collect()
}

/// Release date `days` days before today.
pub fn days_ago(days: i64) -> String {
    (Utc::now() - TimeDelta::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn settings() -> Settings {
    Settings {
        retry: RetryPolicy::new(3, Duration::ZERO),
        page_delay: Duration::ZERO,
        ..Settings::default()
    }
}

pub fn client(fake: FakeSpotify, settings: &Settings) -> RetryingClient<FakeSpotify> {
    RetryingClient::new(fake, settings.retry)
}
