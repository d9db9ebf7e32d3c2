use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::config::RunKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: CursorPage<Artist>,
}

/// Cursor paginated listing. Completion is judged by comparing the number of
/// fetched items against `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub cursors: Option<Cursors>,
    pub total: Option<u64>,
}

impl<T> CursorPage<T> {
    pub fn after(&self) -> Option<&str> {
        self.cursors.as_ref().and_then(|c| c.after.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
}

/// Offset paginated listing. `next` holds the URL of the following page and
/// is absent on the last one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub release_date: String,
    #[serde(default)]
    pub release_date_precision: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
}

impl Album {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map_or("", |a| a.name.as_str())
    }

    /// Start of the earliest day covered by the release date, honouring the
    /// reported precision (`year`, `month` or `day`).
    pub fn release_time(&self) -> Option<DateTime<Utc>> {
        let date = &self.release_date;
        let precision = match self.release_date_precision.as_str() {
            "" => match date.len() {
                4 => "year",
                7 => "month",
                _ => "day",
            },
            p => p,
        };

        let day = match precision {
            "year" => NaiveDate::parse_from_str(&format!("{date}-01-01"), "%Y-%m-%d"),
            "month" => NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d"),
            _ => NaiveDate::parse_from_str(date, "%Y-%m-%d"),
        }
        .ok()?;

        day.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub id: String,
    pub name: String,
}

/// An entry of the user's library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAlbum {
    #[serde(default)]
    pub added_at: String,
    pub album: Album,
}

/// Release groups accepted by the artist albums listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumGroup {
    Album,
    Single,
    Compilation,
}

impl AlbumGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumGroup::Album => "album",
            AlbumGroup::Single => "single",
            AlbumGroup::Compilation => "compilation",
        }
    }

    pub fn join(groups: &[AlbumGroup]) -> String {
        groups
            .iter()
            .map(AlbumGroup::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for AlbumGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// Snapshot of the followed-artist universe produced by the ingest stage.
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// Followed artists in arrival order, blacklist already applied.
    pub artists: Vec<Artist>,
    /// Albums of those artists keyed by album id.
    pub albums: HashMap<String, Album>,
    /// Ids of the albums already in the user's library.
    pub saved_album_ids: HashSet<String>,
}

/// Playlist candidates. The order of `albums` is not meaningful.
#[derive(Debug, Clone)]
pub struct FilteredAlbums {
    pub kind: RunKind,
    pub albums: Vec<Album>,
    /// `now - recency`, read once per filter pass.
    pub cutoff: DateTime<Utc>,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub date: String,
    pub name: String,
    pub artist: String,
}

impl From<&Album> for AlbumTableRow {
    fn from(album: &Album) -> Self {
        Self {
            date: album.release_date.clone(),
            name: album.name.clone(),
            artist: album.primary_artist().to_string(),
        }
    }
}
