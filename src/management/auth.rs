use std::path::PathBuf;

use chrono::Utc;

use crate::{Res, config, spotify, types::Token, warning};

/// Seconds before the actual expiry at which a token is already considered stale.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Owns the cached OAuth token and keeps it fresh.
#[derive(Debug)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Res<Self> {
        let content = async_fs::read_to_string(Self::token_path()).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Res<()> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    pub fn is_cached() -> bool {
        Self::token_path().is_file()
    }

    /// Returns an access token, refreshing it first if it is about to expire.
    ///
    /// A failed refresh keeps the old token; the request made with it fails
    /// and is retried by the caller like any other remote failure.
    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            match spotify::auth::refresh_token(&self.token.refresh_token).await {
                Ok(new_token) => {
                    self.token = new_token;
                    if let Err(e) = self.persist().await {
                        warning!("Failed to save refreshed token: {}", e);
                    }
                }
                Err(e) => warning!("Failed to refresh token: {}", e),
            }
        }

        self.token.access_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        now >= (self.token.obtained_at + self.token.expires_in).saturating_sub(EXPIRY_MARGIN_SECS)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}
