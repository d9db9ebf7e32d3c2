use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::{Mutex, oneshot};

use crate::{Res, error::Error, spotify, types::Token, warning};

/// One-shot hand-over of the login result from the callback listener to the
/// flow waiting in [`spotify::auth::login`].
#[derive(Debug, Clone)]
pub struct LoginHandshake {
    pending: Arc<Mutex<Option<PendingLogin>>>,
}

#[derive(Debug)]
struct PendingLogin {
    state: String,
    code_verifier: String,
    sender: oneshot::Sender<Res<Token>>,
}

impl LoginHandshake {
    pub fn new(state: String, code_verifier: String) -> (Self, oneshot::Receiver<Res<Token>>) {
        let (sender, receiver) = oneshot::channel();
        let handshake = Self {
            pending: Arc::new(Mutex::new(Some(PendingLogin {
                state,
                code_verifier,
                sender,
            }))),
        };
        (handshake, receiver)
    }

    /// Consumes the pending login if `state` matches the one the flow was
    /// started with. A mismatching request leaves the handshake untouched.
    async fn take_matching(&self, state: Option<&str>) -> Result<PendingLogin, &'static str> {
        let mut pending = self.pending.lock().await;
        let state_matches = pending.as_ref().map(|p| Some(p.state.as_str()) == state);
        match state_matches {
            None => Err("No login in progress."),
            Some(false) => Err("State mismatch."),
            Some(true) => pending.take().ok_or("No login in progress."),
        }
    }
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(handshake): Extension<LoginHandshake>,
) -> Html<&'static str> {
    let login = match handshake
        .take_matching(params.get("state").map(String::as_str))
        .await
    {
        Ok(login) => login,
        Err(reason) => {
            warning!("Rejected login callback: {}", reason);
            return Html("<h4>Login failed.</h4>");
        }
    };

    let result = match (params.get("code"), params.get("error")) {
        (Some(code), _) => spotify::auth::exchange_code_pkce(code, &login.code_verifier).await,
        (None, Some(error)) => Err(Error::auth(format!("authorization denied: {error}"))),
        (None, None) => Err(Error::auth("callback without authorization code")),
    };

    let page = match &result {
        Ok(_) => Html("<h2>Login to fangirl completed.</h2><p>You can close this window.</p>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    };

    // The login flow may already have given up; nobody is left to tell.
    let _ = login.sender.send(result);
    page
}
