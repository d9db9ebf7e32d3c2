//! # API Module
//!
//! HTTP endpoints of the short-lived local listener that completes the
//! interactive login.
//!
//! - [`callback`] - receives the authorization code from Spotify's
//!   authorization server, exchanges it for a token and hands the token to
//!   the waiting login flow through a [`LoginHandshake`].
//!
//! The handshake is created per login attempt and delivers exactly one
//! value; later requests to the callback find it consumed and are rejected.

mod callback;

pub use callback::{LoginHandshake, callback};
