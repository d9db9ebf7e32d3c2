use crate::{
    Res, config, info,
    management::TokenManager,
    spotify::{self, SpotifyClient, retry::RetryingClient},
};

pub async fn auth() -> Res<()> {
    let token = spotify::auth::login().await?;

    let client = RetryingClient::new(
        SpotifyClient::new(TokenManager::new(token)),
        config::Settings::default().retry,
    );
    let user = client.current_user().await?;
    info!(
        "You are logged in as: {}",
        user.display_name.as_deref().unwrap_or(&user.id)
    );
    Ok(())
}
