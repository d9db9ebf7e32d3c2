//! Error type shared by every layer of fangirl.
//!
//! Remote failures (`Http`, `Api`, `Json`) are all treated as transient by the
//! retry layer; nothing in the crate branches on the status code. `Config` and
//! `Auth` errors are raised before the first remote call of a run.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Res<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport level failure (connection reset, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Spotify API error (status {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing credentials, conflicting options, unreadable blacklist, ...
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}
