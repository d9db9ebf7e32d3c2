//! Configuration management for fangirl.
//!
//! Two sources feed a run:
//! 1. Environment variables (optionally seeded from `<data_local_dir>/fangirl/.env`),
//!    which carry the Spotify application credentials and endpoints.
//! 2. Command line options, resolved into a [`Settings`] value that the
//!    pipeline consumes. The pipeline never parses anything itself.

use std::{collections::HashSet, env, fmt, path::PathBuf, time::Duration};

use chrono::TimeDelta;

use crate::{Res, error::Error, spotify::retry::RetryPolicy, utils};

pub const DEFAULT_PLAYLIST_NAME: &str = "fangirl";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_RECENCY_DAYS: i64 = 31;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

pub const SPOTIFY_SCOPE: &str =
    "user-follow-read user-library-read playlist-read-private playlist-modify-private";

/// Loads environment variables from `<data_local_dir>/fangirl/.env`.
///
/// A missing file is not an error, the process environment alone may carry
/// the configuration. Values already present in the environment win.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
    }
    Ok(())
}

/// Platform specific data directory of the application, e.g.
/// `~/.local/share/fangirl` on Linux.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("fangirl");
    path
}

/// Address the local OAuth callback listener binds to.
pub fn server_addr() -> String {
    env_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the registered Spotify application. Required for every
/// command talking to Spotify.
pub fn spotify_client_id() -> Res<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config("SPOTIFY_API_AUTH_CLIENT_ID must be set"))
}

pub fn spotify_redirect_uri() -> String {
    env_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_apiauth_url() -> String {
    env_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    env_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    env_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// What kind of playlist a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Unsaved albums released within the recency window.
    RecentReleases,
    /// Unsaved albums released before the recency window.
    AllUnliked,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::RecentReleases => f.write_str("recent releases"),
            RunKind::AllUnliked => f.write_str("unliked albums"),
        }
    }
}

/// Raw options of a `run` invocation before validation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub recent: Option<String>,
    pub unliked: Option<String>,
    pub duration: Option<Duration>,
    pub blacklist_file: Option<PathBuf>,
    pub market: Option<String>,
    pub max_attempts: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub page_delay: Option<Duration>,
    pub dry_run: bool,
}

/// Everything the pipeline needs to know about a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kind: RunKind,
    pub playlist_name: String,
    pub recency: TimeDelta,
    pub blacklist: HashSet<String>,
    pub market: String,
    pub retry: RetryPolicy,
    /// Pause between two page advances of the same artist's albums.
    pub page_delay: Duration,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kind: RunKind::RecentReleases,
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            recency: TimeDelta::days(DEFAULT_RECENCY_DAYS),
            blacklist: HashSet::new(),
            market: DEFAULT_MARKET.to_string(),
            retry: RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY),
            page_delay: DEFAULT_PAGE_DELAY,
            dry_run: false,
        }
    }
}

impl Settings {
    /// Validates the raw options and reads the blacklist file, if any.
    pub async fn resolve(opts: RunOptions) -> Res<Self> {
        let (kind, playlist_name) = match (opts.recent, opts.unliked) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "cannot specify both --recent and --unliked in the same invocation",
                ));
            }
            (None, Some(name)) => (RunKind::AllUnliked, name),
            (Some(name), None) => (RunKind::RecentReleases, name),
            (None, None) => (RunKind::RecentReleases, DEFAULT_PLAYLIST_NAME.to_string()),
        };

        if playlist_name.trim().is_empty() {
            return Err(Error::config("playlist name must not be empty"));
        }

        let defaults = Settings::default();

        let recency = match opts.duration {
            Some(d) => TimeDelta::from_std(d)
                .map_err(|_| Error::config(format!("duration {d:?} is out of range")))?,
            None => defaults.recency,
        };
        if recency <= TimeDelta::zero() {
            return Err(Error::config("duration must be greater than zero"));
        }

        let blacklist = match opts.blacklist_file {
            Some(path) => {
                let content = async_fs::read_to_string(&path).await.map_err(|e| {
                    Error::config(format!("cannot read blacklist {}: {e}", path.display()))
                })?;
                utils::parse_blacklist(&content)
            }
            None => HashSet::new(),
        };

        let retry = RetryPolicy::new(
            opts.max_attempts.unwrap_or(defaults.retry.max_attempts()),
            opts.retry_delay.unwrap_or(defaults.retry.delay()),
        );

        Ok(Self {
            kind,
            playlist_name,
            recency,
            blacklist,
            market: opts.market.unwrap_or(defaults.market),
            retry,
            page_delay: opts.page_delay.unwrap_or(defaults.page_delay),
            dry_run: opts.dry_run,
        })
    }

    pub fn is_blacklisted(&self, artist_name: &str) -> bool {
        self.blacklist.contains(artist_name)
    }
}
