use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api};

/// Serves the login callback on an already bound listener until aborted.
pub async fn start_api_server(listener: TcpListener, handshake: api::LoginHandshake) -> Res<()> {
    let app = Router::new().route("/callback", get(api::callback).layer(Extension(handshake)));

    axum::serve(listener, app).await?;
    Ok(())
}
