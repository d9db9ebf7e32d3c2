use tabled::Table;

use crate::{
    Res,
    config::Settings,
    info,
    pipeline::{self, Outcome},
    spotify::{self, retry::RetryingClient},
    success,
    types::AlbumTableRow,
    utils,
};

pub async fn run(settings: Settings) -> Res<()> {
    let client = spotify::auth::acquire_client().await?;
    let client = RetryingClient::new(client, settings.retry);

    info!(
        "Collecting {} with a {} window for playlist {:?}",
        settings.kind,
        utils::human_duration(settings.recency),
        settings.playlist_name
    );

    match pipeline::curate(&client, &settings).await? {
        Outcome::DryRun(filtered) => {
            let mut rows: Vec<AlbumTableRow> =
                filtered.albums.iter().map(AlbumTableRow::from).collect();
            rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.artist.cmp(&b.artist)));

            println!("{}", Table::new(rows));
            info!("Dry run: {} albums would be imported", filtered.albums.len());
        }
        Outcome::Created { playlist, albums } => {
            success!("Imported {} albums into {:?}", albums, playlist.name);
        }
    }

    Ok(())
}
