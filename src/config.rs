//! Configuration management for spotgate.
//!
//! This module is the only place that reads the process environment. It loads
//! an optional `.env` file from the local data directory and resolves a
//! [`ProviderConfig`] from environment variables, falling back to the Spotify
//! defaults where a value is optional.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::{
    error::{Error, Result},
    spotify::{ProviderConfig, provider},
    utils,
};

const APP_DIR: &str = "spotgate";

/// Loads environment variables from `.env` in the local data directory.
///
/// The file lives in:
/// - Linux: `~/.local/share/spotgate/.env`
/// - macOS: `~/Library/Application Support/spotgate/.env`
/// - Windows: `%LOCALAPPDATA%/spotgate/.env`
///
/// A missing file is fine; variables may come from the environment alone.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file exists but cannot be
/// parsed.
pub async fn load_env() -> Result<()> {
    let path = app_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Resolves the provider configuration from the environment.
///
/// | Variable | Required | Default |
/// |---|---|---|
/// | `SPOTIFY_CLIENT_ID` | yes | |
/// | `SPOTIFY_CLIENT_SECRET` | yes | |
/// | `SPOTIFY_CALLBACK_URI` | no | `http://localhost:3000/callback` |
/// | `SPOTIFY_SCOPES` | no | the built-in scope list |
/// | `SPOTIFY_AUTH_URL` | no | `https://accounts.spotify.com/authorize` |
/// | `SPOTIFY_TOKEN_URL` | no | `https://accounts.spotify.com/api/token` |
/// | `SPOTIFY_API_URL` | no | `https://api.spotify.com/v1` |
/// | `SPOTIFY_REQUEST_TIMEOUT_SECS` | no | `30` |
///
/// `SPOTIFY_SCOPES` may separate scopes with spaces or commas.
///
/// # Errors
///
/// Returns [`Error::Config`] when a required variable is missing or the
/// timeout is not a number.
pub fn provider_config() -> Result<ProviderConfig> {
    let client_id = required("SPOTIFY_CLIENT_ID")?;
    let client_secret = required("SPOTIFY_CLIENT_SECRET")?;

    let mut config = ProviderConfig::new(client_id, client_secret)
        .with_redirect_uri(or_default("SPOTIFY_CALLBACK_URI", provider::DEFAULT_REDIRECT_URI))
        .with_endpoints(
            or_default("SPOTIFY_AUTH_URL", provider::AUTH_URL),
            or_default("SPOTIFY_TOKEN_URL", provider::TOKEN_URL),
            or_default("SPOTIFY_API_URL", provider::API_URL),
        );

    if let Some(scopes) = optional("SPOTIFY_SCOPES") {
        config = config.with_scopes(utils::parse_scopes(&scopes));
    }

    if let Some(secs) = optional("SPOTIFY_REQUEST_TIMEOUT_SECS") {
        let secs: u64 = secs.parse().map_err(|_| {
            Error::config(format!("SPOTIFY_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
        })?;
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

/// Address the local callback server binds to.
///
/// Uses `SERVER_ADDRESS` if set, otherwise the host and port of the redirect
/// URI (`localhost` maps to `127.0.0.1`).
///
/// # Example
///
/// ```
/// let addr = server_addr(&config)?; // e.g. "127.0.0.1:3000"
/// ```
pub fn server_addr(config: &ProviderConfig) -> Result<String> {
    if let Some(addr) = optional("SERVER_ADDRESS") {
        return Ok(addr);
    }

    let redirect = Url::parse(&config.redirect_uri)?;
    let host = match redirect.host_str() {
        Some("localhost") | None => "127.0.0.1",
        Some(host) => host,
    };
    let port = redirect.port_or_known_default().unwrap_or(3000);
    Ok(format!("{}:{}", host, port))
}

/// Returns the Spotify user id playlists are created for, if configured.
///
/// Falls back to the id of the authenticated user when unset.
pub fn spotify_user() -> Option<String> {
    optional("SPOTIFY_USER_ID")
}

pub fn token_cache_path() -> PathBuf {
    app_dir().join("cache").join("token.json")
}

fn app_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| Error::config(format!("{} must be set", key)))
}
