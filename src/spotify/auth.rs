use std::{net::SocketAddr, str::FromStr, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::{net::TcpListener, time::timeout};

use crate::{
    Res,
    api::LoginHandshake,
    config,
    error::Error,
    info,
    management::TokenManager,
    server::start_api_server,
    spotify::SpotifyClient,
    success,
    types::Token,
    utils, warning,
};

/// How long the interactive login waits for the browser to come back.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Returns an authenticated client, from the cached token if there is one,
/// through the interactive login otherwise.
pub async fn acquire_client() -> Res<SpotifyClient> {
    config::spotify_client_id()?;

    let tokens = if TokenManager::is_cached() {
        match TokenManager::load().await {
            Ok(tokens) => tokens,
            Err(e) => {
                warning!("Cached token is unusable, logging in again: {}", e);
                TokenManager::new(login().await?)
            }
        }
    } else {
        TokenManager::new(login().await?)
    };

    Ok(SpotifyClient::new(tokens))
}

/// Runs the OAuth 2.0 PKCE authorization code flow and caches the token.
///
/// 1. Generates the code verifier, its S256 challenge and a `state` value.
/// 2. Binds the callback listener, then opens the authorization URL in the
///    browser (or prints it if no browser can be launched).
/// 3. Waits for the listener to hand over exactly one token through a
///    [`LoginHandshake`], bounded by a timeout.
/// 4. Stops the listener and persists the token.
pub async fn login() -> Res<Token> {
    let client_id = config::spotify_client_id()?;
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let addr = SocketAddr::from_str(&config::server_addr())
        .map_err(|e| Error::config(format!("invalid SERVER_ADDRESS: {e}")))?;
    let listener = TcpListener::bind(addr).await?;

    let (handshake, token_rx) = LoginHandshake::new(state.clone(), code_verifier);
    let server = tokio::spawn(start_api_server(listener, handshake));

    let redirect_uri = config::spotify_redirect_uri();
    let auth_url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge.as_str()),
            ("state", state.as_str()),
            ("scope", config::SPOTIFY_SCOPE),
        ],
    )
    .map_err(|e| Error::config(format!("invalid SPOTIFY_API_AUTH_URL: {e}")))?;

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    } else {
        info!("Waiting for the Spotify login to complete in your browser...");
    }

    let outcome = timeout(LOGIN_TIMEOUT, token_rx).await;
    server.abort();

    let token = match outcome {
        Ok(Ok(result)) => result?,
        Ok(Err(_)) => return Err(Error::auth("callback listener stopped unexpectedly")),
        Err(_) => {
            return Err(Error::auth(format!(
                "no login within {} seconds",
                LOGIN_TIMEOUT.as_secs()
            )));
        }
    };

    TokenManager::new(token.clone()).persist().await?;
    success!("Authentication successful!");

    Ok(token)
}

/// Exchanges a refresh token for a new access token. Spotify may omit the
/// refresh token in the answer, in which case the old one stays valid.
pub async fn refresh_token(refresh_token: &str) -> Res<Token> {
    let client_id = config::spotify_client_id()?;
    let res = request_token(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id.as_str()),
    ])
    .await?;

    Ok(into_token(res, refresh_token))
}

/// Exchanges the authorization code received on the callback for a token.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Res<Token> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let res = request_token(&[
        ("grant_type", "authorization_code"),
        ("client_id", client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", redirect_uri.as_str()),
    ])
    .await?;

    Ok(into_token(res, ""))
}

async fn request_token(form: &[(&str, &str)]) -> Res<TokenResponse> {
    let response = Client::new()
        .post(config::spotify_apitoken_url())
        .form(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api { status, message });
    }

    Ok(response.json::<TokenResponse>().await?)
}

fn into_token(res: TokenResponse, previous_refresh_token: &str) -> Token {
    Token {
        access_token: res.access_token,
        refresh_token: res
            .refresh_token
            .unwrap_or_else(|| previous_refresh_token.to_string()),
        scope: res.scope,
        expires_in: res.expires_in,
        obtained_at: Utc::now().timestamp().max(0) as u64,
    }
}
