//! spotgate library
//!
//! A client-side gateway to the Spotify Web API. It runs the OAuth2
//! authorization code flow, holds the session's access token and issues
//! authenticated REST calls (profile, catalog, search, recommendations,
//! playlists) on behalf of a single user.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment and `.env` based configuration
//! - `error` - Library error type
//! - `management` - Token storage and caching
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Authenticator and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotgate::{ApiClient, Authenticator, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> spotgate::Result<()> {
//!     let auth = Authenticator::new(ProviderConfig::new("client-id", "client-secret"))?;
//!     let (url, _state) = auth.begin_authorization().await?;
//!     println!("Open {}", url);
//!     // ... auth.handle_callback(&params).await? once Spotify redirects back
//!     let api = ApiClient::new(auth.authenticated_client())?;
//!     let me = api.me().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use management::TokenStore;
pub use spotify::{
    ApiClient, AuthState, AuthenticatedClient, Authenticator, Body, ProviderConfig, Query,
};

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Added {} tracks to playlist", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, open the URL manually");
/// warning!("Token cache not found at {}", path);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
