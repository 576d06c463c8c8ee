//! # CLI Module
//!
//! User-facing commands of the `spotgate` binary. Each command resolves the
//! configuration, builds an [`Authenticator`] around the cached token and
//! delegates to [`crate::spotify`]; this layer only handles presentation,
//! progress feedback and turning errors into messages.
//!
//! ## Commands
//!
//! - [`auth`] - authorization code login through the local callback server
//! - [`status`], [`logout`], [`client_token`] - session handling
//! - [`me`] - profile of the authenticated user
//! - [`artists`], [`albums`], [`track`] - catalog lookups
//! - [`search`], [`recommendations`], [`featured`] - browsing
//! - [`create_playlist`], [`add_to_playlist`] - playlist management
//!
//! ## Usage
//!
//! ```bash
//! spotgate auth                              # Log in with Spotify
//! spotgate search "daft punk" --type artist  # Search the catalog
//! spotgate playlist create "Picks" --track spotify:track:4uLU6hMCjMI75M1A2tKUQC
//! ```

mod auth;
mod browse;
mod catalog;
mod playlist;
mod session;

pub use auth::auth;
pub use browse::{featured, recommendations, search};
pub use catalog::{albums, artists, track};
pub use playlist::{add_to_playlist, create_playlist};
pub use session::{client_token, logout, me, status};

use crate::{
    ApiClient, Authenticator, ProviderConfig, TokenStore, config, error, utils, warning,
};

fn provider_config() -> ProviderConfig {
    match config::provider_config() {
        Ok(config) => config,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    }
}

async fn authenticator() -> Authenticator {
    let store = TokenStore::with_cache(config::token_cache_path());
    if let Err(e) = store.load().await {
        warning!("Ignoring unreadable token cache. Err: {}", e);
    }

    match Authenticator::with_store(provider_config(), store) {
        Ok(auth) => auth,
        Err(e) => error!("Cannot set up HTTP client. Err: {}", e),
    }
}

async fn api_client() -> ApiClient {
    let auth = authenticator().await;
    if auth.store().current().await.is_none() {
        error!("No token found. Please run spotgate auth");
    }

    match ApiClient::new(auth.authenticated_client()) {
        Ok(api) => api,
        Err(e) => error!("Cannot set up API client. Err: {}", e),
    }
}

async fn fetch<T>(
    message: &str,
    request: impl std::future::Future<Output = crate::Result<T>>,
) -> T {
    let pb = utils::spinner(message);
    let result = request.await;
    pb.finish_and_clear();

    match result {
        Ok(value) => value,
        Err(e) if e.requires_login() => error!("{}. Please run spotgate auth", e),
        Err(e) => error!("{}", e),
    }
}
