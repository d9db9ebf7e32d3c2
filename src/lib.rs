//! fangirl library
//!
//! Curates a Spotify playlist from the albums of followed artists that are
//! not saved in the user's library yet, either recent releases or the
//! backlog before a cutoff. A run makes thousands of rate limited calls, so
//! every call goes through a bounded retry layer.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local login callback listener
//! - `cli` - Command implementations
//! - `config` - Environment and run settings
//! - `error` - Crate error type
//! - `management` - Token cache
//! - `pipeline` - Ingest, filter and playlist building
//! - `server` - Local HTTP server for the OAuth callback
//! - `spotify` - Spotify Web API client and retry layer
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Res};

/// Prints a status line with a blue `o` marker.
///
/// ```
/// info!("Fetching all followed artists");
/// info!("{} of {} albums imported", done, total);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints the error to stderr with a red `!` marker and exits with status 1.
///
/// Only the binary's top-level handler uses this; library code returns
/// [`Error`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a line with a yellow `!` marker for things the user should notice
/// that do not stop the run, like a skipped album or a failed token refresh.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
