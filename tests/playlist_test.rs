mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::{FakeSpotify, album, client, settings, tracks};
use fangirl::{
    config::RunKind,
    error::Error,
    pipeline::{
        PlaylistBuilder,
        playlist::{playlist_description, playlist_name},
    },
    spotify::retry::RetryPolicy,
    types::FilteredAlbums,
};

fn filtered(ids: &[&str]) -> FilteredAlbums {
    FilteredAlbums {
        kind: RunKind::RecentReleases,
        albums: ids
            .iter()
            .map(|id| album(id, "Artist A", "2024-06-20"))
            .collect(),
        cutoff: Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_tracks_are_added_in_batches_of_at_most_100() {
    let settings = settings();
    let mut fake = FakeSpotify::new();
    fake.tracks.insert("big".to_string(), tracks("big", 250));
    let client = client(fake, &settings);

    PlaylistBuilder::new(&client, &settings)
        .build(filtered(&["big"]))
        .await
        .unwrap();

    let fake = client.inner();
    assert_eq!(fake.batch_sizes(), vec![100, 100, 50]);
    let added: Vec<String> = fake
        .added
        .borrow()
        .iter()
        .flat_map(|(_, uris)| uris.clone())
        .collect();
    let expected: Vec<String> = tracks("big", 250).into_iter().map(|t| t.uri).collect();
    assert_eq!(added, expected);
}

#[tokio::test]
async fn test_batches_span_track_pages_but_not_albums() {
    let settings = settings();
    let mut fake = FakeSpotify::new();
    fake.page_size = 50;
    fake.tracks.insert("short".to_string(), tracks("short", 30));
    fake.tracks.insert("long".to_string(), tracks("long", 120));
    fake.tracks.insert("exact".to_string(), tracks("exact", 100));
    let client = client(fake, &settings);

    PlaylistBuilder::new(&client, &settings)
        .build(filtered(&["short", "long", "exact"]))
        .await
        .unwrap();

    assert_eq!(client.inner().batch_sizes(), vec![30, 100, 20, 100]);
}

#[tokio::test]
async fn test_album_without_tracks_adds_nothing() {
    let settings = settings();
    let client = client(FakeSpotify::new(), &settings);

    PlaylistBuilder::new(&client, &settings)
        .build(filtered(&["silent"]))
        .await
        .unwrap();

    assert!(client.inner().added.borrow().is_empty());
    assert_eq!(client.inner().calls_to("album_tracks"), 1);
}

#[tokio::test]
async fn test_playlist_is_private_and_named_after_the_cutoff() {
    let mut settings = settings();
    settings.playlist_name = "Fresh".to_string();
    let client = client(FakeSpotify::new(), &settings);

    let playlist = PlaylistBuilder::new(&client, &settings)
        .build(filtered(&[]))
        .await
        .unwrap();

    assert_eq!(playlist.name, "Fresh (May 30, 2024)");
    let created = client.inner().created.borrow().clone();
    assert_eq!(created.len(), 1);
    let (user, name, description, public) = &created[0];
    assert_eq!(user, "listener");
    assert_eq!(name, "Fresh (May 30, 2024)");
    assert!(description.contains("2024-05-30T12:00:00Z"));
    assert!(!public);
}

#[test]
fn test_playlist_name_and_description() {
    let cutoff = Utc.with_ymd_and_hms(2026, 9, 4, 8, 30, 0).unwrap();

    assert_eq!(playlist_name("fangirl", cutoff), "fangirl (September 4, 2026)");
    assert!(
        playlist_description(RunKind::RecentReleases, cutoff)
            .starts_with("Albums released since 2026-09-04T08:30:00Z")
    );
    assert!(
        playlist_description(RunKind::AllUnliked, cutoff)
            .starts_with("Albums released before 2026-09-04T08:30:00Z")
    );
}

#[tokio::test]
async fn test_failed_add_aborts_the_build() {
    let mut settings = settings();
    settings.retry = RetryPolicy::new(0, Duration::ZERO);
    let mut fake = FakeSpotify::new();
    fake.tracks.insert("first".to_string(), tracks("first", 10));
    fake.tracks.insert("second".to_string(), tracks("second", 10));
    // current_user, create_playlist, album_tracks and next_page succeed, the
    // first add fails.
    fake.fail_after(4);
    let client = client(fake, &settings);

    let result = PlaylistBuilder::new(&client, &settings)
        .build(filtered(&["first", "second"]))
        .await;

    assert!(matches!(result, Err(Error::Api { .. })));
    assert!(client.inner().added.borrow().is_empty());
    assert_eq!(client.inner().calls_to("album_tracks"), 1);
}
