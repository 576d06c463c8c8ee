//! # Spotify Integration Module
//!
//! Authentication and authenticated requests against the Spotify Web API.
//!
//! ## Layers
//!
//! ```text
//! Authenticator  (authorize URL, callback check, token endpoint, refresh)
//!      ↓ owns
//! TokenStore     (current token behind an async RwLock, optional cache file)
//!      ↓ read by
//! AuthenticatedClient (bearer header on every request)
//!      ↓ wrapped by
//! ApiClient      (one generic request helper + endpoint wrappers)
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the OAuth 2.0 authorization code grant with a client
//! secret. The token endpoint is called with HTTP Basic authentication
//! (`base64(client_id:client_secret)`) for the `authorization_code`,
//! `refresh_token` and `client_credentials` grants.
//!
//! ## Resource calls
//!
//! [`client`] holds [`ApiClient::request`], the single place where requests are
//! built, sent, checked and decoded. The endpoint wrappers live next to it:
//!
//! - [`users`] - `GET /me`
//! - [`catalog`] - `GET /artists`, `GET /albums`, `GET /tracks/{id}`
//! - [`browse`] - `GET /search`, `GET /recommendations`,
//!   `GET /browse/featured-playlists`
//! - [`playlist`] - `POST /users/{id}/playlists`, `POST /playlists/{id}/tracks`
//!
//! ## Errors
//!
//! All functions return [`crate::Result`]. A non-2xx answer becomes
//! [`crate::Error::Api`] with the status and the raw body; the body is never
//! decoded as a success value.

pub mod auth;
pub mod browse;
pub mod catalog;
pub mod client;
pub mod playlist;
pub mod provider;
pub mod users;

pub use auth::{AuthState, AuthenticatedClient, Authenticator};
pub use client::{ApiClient, Body, Query};
pub use provider::ProviderConfig;
