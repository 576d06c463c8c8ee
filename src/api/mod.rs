//! # API Module
//!
//! HTTP endpoints of the local server that receives the OAuth redirect.
//!
//! - [`callback`] - consumes `code`, `state` and `error` from Spotify's
//!   redirect, hands them to [`crate::spotify::Authenticator::handle_callback`]
//!   and records the outcome in the shared [`CallbackState`]
//! - [`health`] - reports liveness, version and the session's auth state
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use spotgate::api::{CallbackState, callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health))
//!     .layer(Extension(CallbackState::new(authenticator)));
//! ```

mod callback;
mod health;

pub use callback::{CallbackState, callback};
pub use health::health;
