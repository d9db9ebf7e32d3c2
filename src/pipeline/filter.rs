use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    config::RunKind,
    info,
    types::{Album, FilteredAlbums, IngestResult},
    warning,
};

/// Narrows the ingested albums down to the playlist candidates.
///
/// `now` is read once for the whole pass.
pub fn filter(ingest: IngestResult, kind: RunKind, recency: TimeDelta) -> FilteredAlbums {
    info!("Filtering albums");
    let filtered = filter_at(
        ingest.albums.into_values(),
        &ingest.saved_album_ids,
        kind,
        recency,
        Utc::now(),
    );
    info!("{} albums left after filtering", filtered.albums.len());
    filtered
}

/// Keeps the first occurrence of every album id and, of those, the albums not
/// in `saved` whose age relative to `now` is strictly below `recency`
/// ([`RunKind::RecentReleases`]) or at least `recency` ([`RunKind::AllUnliked`]).
///
/// Albums without a parseable release date qualify for neither kind.
pub fn filter_at<I>(
    albums: I,
    saved: &HashSet<String>,
    kind: RunKind,
    recency: TimeDelta,
    now: DateTime<Utc>,
) -> FilteredAlbums
where
    I: IntoIterator<Item = Album>,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for album in albums {
        if !seen.insert(album.id.clone()) {
            continue;
        }
        if saved.contains(&album.id) {
            continue;
        }

        let Some(released) = album.release_time() else {
            warning!(
                "Skipping album {:?} with unreadable release date {:?}",
                album.name,
                album.release_date
            );
            continue;
        };

        let is_recent = now - released < recency;
        let keep = match kind {
            RunKind::RecentReleases => is_recent,
            RunKind::AllUnliked => !is_recent,
        };
        if keep {
            kept.push(album);
        }
    }

    FilteredAlbums {
        kind,
        albums: kept,
        cutoff: now - recency,
    }
}
