//! # Pipeline
//!
//! The three stages of a run, strictly sequential:
//!
//! ```text
//! Ingester ──IngestResult──▶ filter ──FilteredAlbums──▶ PlaylistBuilder
//! ```
//!
//! Each stage hands its result to the next by value. All remote calls go
//! through one [`RetryingClient`] and are awaited one at a time; a run is
//! bound by Spotify's rate limit, not by local work.

pub mod filter;
pub mod ingest;
pub mod playlist;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use filter::{filter, filter_at};
pub use ingest::Ingester;
pub use playlist::PlaylistBuilder;

use crate::{
    Res,
    config::Settings,
    spotify::{SpotifyApi, retry::RetryingClient},
    types::{FilteredAlbums, Playlist},
};

/// What a completed run did.
#[derive(Debug)]
pub enum Outcome {
    /// Dry run: the candidates that would have been imported.
    DryRun(FilteredAlbums),
    Created { playlist: Playlist, albums: usize },
}

/// Ingest, filter and, unless this is a dry run, build the playlist.
pub async fn curate<A: SpotifyApi>(
    client: &RetryingClient<A>,
    settings: &Settings,
) -> Res<Outcome> {
    let ingested = Ingester::new(client, settings).ingest().await?;
    let filtered = filter(ingested, settings.kind, settings.recency);

    if settings.dry_run {
        return Ok(Outcome::DryRun(filtered));
    }

    let albums = filtered.albums.len();
    let playlist = PlaylistBuilder::new(client, settings).build(filtered).await?;
    Ok(Outcome::Created { playlist, albums })
}

pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub(crate) fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.blue} {pos}/{len} {wide_msg}") {
        pb.set_style(style);
    }
    pb
}
