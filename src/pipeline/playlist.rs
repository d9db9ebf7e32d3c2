use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    Res,
    config::{RunKind, Settings},
    info,
    spotify::{MAX_TRACKS_PER_REQUEST, SpotifyApi, retry::RetryingClient},
    success,
    types::{Album, FilteredAlbums, Playlist},
    utils,
};

/// Creates the destination playlist and fills it with the tracks of the
/// filtered albums.
///
/// Fails fast: a call failing after its retries aborts the build and leaves
/// the playlist as far as it got.
pub struct PlaylistBuilder<'a, A> {
    client: &'a RetryingClient<A>,
    settings: &'a Settings,
}

impl<'a, A: SpotifyApi> PlaylistBuilder<'a, A> {
    pub fn new(client: &'a RetryingClient<A>, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    pub async fn build(&self, filtered: FilteredAlbums) -> Res<Playlist> {
        let user = self.client.current_user().await?;

        let name = playlist_name(&self.settings.playlist_name, filtered.cutoff);
        let description = playlist_description(filtered.kind, filtered.cutoff);
        let playlist = self
            .client
            .create_playlist(&user.id, &name, &description, false)
            .await?;
        success!("Created playlist {:?}", playlist.name);

        let total = filtered.albums.len();
        for (i, album) in filtered.albums.iter().enumerate() {
            self.import_album(&playlist.id, album).await?;
            info!("{} of {} albums imported", i + 1, total);
        }

        Ok(playlist)
    }

    /// Adds every track of `album`, flushing each time a full batch is
    /// collected and once more for the remainder after the last page.
    async fn import_album(&self, playlist_id: &str, album: &Album) -> Res<usize> {
        let mut page = self.client.album_tracks(&album.id).await?;
        let mut batch: Vec<String> = Vec::with_capacity(MAX_TRACKS_PER_REQUEST);
        let mut added = 0;

        loop {
            for track in page.items.drain(..) {
                batch.push(track.uri);
                if batch.len() == MAX_TRACKS_PER_REQUEST {
                    self.client.add_tracks(playlist_id, &batch).await?;
                    added += batch.len();
                    batch.clear();
                }
            }

            match self.client.next_page(&page).await? {
                Some(next) => page = next,
                None => break,
            }
        }

        if !batch.is_empty() {
            self.client.add_tracks(playlist_id, &batch).await?;
            added += batch.len();
        }

        Ok(added)
    }
}

/// `<base> (<cutoff date>)`, e.g. `fangirl (September 14, 2026)`.
pub fn playlist_name(base: &str, cutoff: DateTime<Utc>) -> String {
    format!("{} ({})", base, utils::human_date(cutoff))
}

pub fn playlist_description(kind: RunKind, cutoff: DateTime<Utc>) -> String {
    let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Secs, true);
    match kind {
        RunKind::RecentReleases => format!(
            "Albums released since {cutoff} by artists you follow that are not in your library yet. Created by fangirl."
        ),
        RunKind::AllUnliked => format!(
            "Albums released before {cutoff} by artists you follow that are not in your library yet. Created by fangirl."
        ),
    }
}
