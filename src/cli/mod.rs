//! # CLI Module
//!
//! Command implementations behind the `fangirl` binary. Each command returns
//! its error instead of exiting; `main` is the only place that decides the
//! exit status.
//!
//! - [`auth`] - interactive Spotify login, caches the token for later runs
//! - [`run`] - ingest, filter and build the playlist (or list it on a dry run)

mod auth;
mod run;

pub use auth::auth;
pub use run::run;
