use std::collections::{HashMap, HashSet};

use indicatif::ProgressBar;
use tokio::time::sleep;
use tracing::debug;

use crate::{
    Res,
    config::Settings,
    info,
    pipeline::{progress_bar, spinner},
    spotify::{SpotifyApi, retry::RetryingClient},
    success,
    types::{Album, AlbumGroup, Artist, IngestResult},
    warning,
};

/// Release groups fetched for every followed artist.
pub const ALBUM_GROUPS: [AlbumGroup; 3] =
    [AlbumGroup::Album, AlbumGroup::Compilation, AlbumGroup::Single];

/// Collects followed artists, their albums and the saved albums.
///
/// Any call failing after its retries aborts the whole ingest; no partial
/// result is returned.
pub struct Ingester<'a, A> {
    client: &'a RetryingClient<A>,
    settings: &'a Settings,
}

impl<'a, A: SpotifyApi> Ingester<'a, A> {
    pub fn new(client: &'a RetryingClient<A>, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    pub async fn ingest(&self) -> Res<IngestResult> {
        info!("Fetching all followed artists");
        let artists = self.fetch_followed_artists().await?;
        success!("Fetched {} followed artists", artists.len());

        info!("Getting albums for artists");
        let albums = self.fetch_albums_for_artists(&artists).await?;
        success!("Fetched {} albums", albums.len());

        info!("Getting saved albums");
        let saved_album_ids = self.fetch_saved_albums().await?;
        success!("Fetched {} saved albums", saved_album_ids.len());

        Ok(IngestResult {
            artists,
            albums,
            saved_album_ids,
        })
    }

    /// Pages through the followed artists until as many have been fetched as
    /// the service reports in total, or until the cursor runs out when no
    /// total is reported. Blacklisted artists are dropped, the others keep
    /// their arrival order.
    pub async fn fetch_followed_artists(&self) -> Res<Vec<Artist>> {
        let pb = spinner("Fetching followed artists...");
        let mut artists = Vec::new();
        let mut after: Option<String> = None;
        let mut fetched: u64 = 0;

        loop {
            let page = self.client.followed_artists(after.as_deref()).await?;
            let total = page.total;
            let next_after = page.after().map(str::to_string);
            let page_len = page.items.len();

            for artist in page.items {
                fetched += 1;
                if self.settings.is_blacklisted(&artist.name) {
                    pb.suspend(|| info!("Skipping blacklisted artist: {:?}", artist.name));
                    continue;
                }
                artists.push(artist);
            }

            match total {
                Some(total) => {
                    pb.set_message(format!("Fetched {fetched} of {total} followed artists"));
                    if fetched >= total {
                        break;
                    }
                }
                None => pb.set_message(format!("Fetched {fetched} followed artists")),
            }

            // Without a total, or with one that shrank while paging, the
            // cursor decides.
            match next_after {
                Some(cursor) if page_len > 0 => after = Some(cursor),
                _ => {
                    if let Some(total) = total {
                        pb.suspend(|| {
                            warning!(
                                "Followed artists ended after {} of {} reported",
                                fetched,
                                total
                            )
                        });
                    }
                    break;
                }
            }
        }

        pb.finish_and_clear();
        Ok(artists)
    }

    /// Fetches the albums, compilations and singles of every artist in the
    /// configured market, keyed by album id.
    ///
    /// Pages of one artist are advanced until the end-of-pages signal, with
    /// `page_delay` between two advances to stay under the rate limit.
    pub async fn fetch_albums_for_artists(
        &self,
        artists: &[Artist],
    ) -> Res<HashMap<String, Album>> {
        let pb = progress_bar(artists.len() as u64);
        let mut albums = HashMap::new();

        for artist in artists {
            pb.set_message(artist.name.clone());
            let count = self.fetch_artist_albums(artist, &mut albums, &pb).await?;
            debug!(artist = %artist.name, count, "fetched artist albums");
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(albums)
    }

    async fn fetch_artist_albums(
        &self,
        artist: &Artist,
        albums: &mut HashMap<String, Album>,
        pb: &ProgressBar,
    ) -> Res<usize> {
        let mut page = self
            .client
            .artist_albums(&artist.id, &self.settings.market, &ALBUM_GROUPS)
            .await?;
        let mut count = 0;

        loop {
            count += page.items.len();
            for album in page.items.drain(..) {
                albums.insert(album.id.clone(), album);
            }

            match self.client.next_page(&page).await? {
                Some(next) => page = next,
                None => break,
            }

            pb.set_message(format!("{} ({} albums)", artist.name, count));
            sleep(self.settings.page_delay).await;
        }

        Ok(count)
    }

    /// Ids of every album in the user's library.
    pub async fn fetch_saved_albums(&self) -> Res<HashSet<String>> {
        let pb = spinner("Fetching saved albums...");
        let mut page = self.client.saved_albums().await?;
        let mut saved = HashSet::new();

        loop {
            saved.extend(page.items.iter().map(|s| s.album.id.clone()));
            pb.set_message(format!(
                "Fetched {} of {} saved albums",
                saved.len(),
                page.total
            ));

            match self.client.next_page(&page).await? {
                Some(next) => page = next,
                None => break,
            }
        }

        pb.finish_and_clear();
        Ok(saved)
    }
}
