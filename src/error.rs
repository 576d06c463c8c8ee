//! Error type shared by the authentication and request layers.
//!
//! Every fallible library operation returns [`Result`]. The variants follow the
//! life of a session: the authorization callback (`AuthorizationDenied`,
//! `StateMismatch`, `MissingCode`), the token endpoint (`TokenExchangeFailed`),
//! token availability (`NotAuthenticated`, `TokenExpired`) and resource calls
//! (`Api`, `Decode`).

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Spotify answered the authorization redirect with an `error` parameter.
    #[error("authorization denied by provider: {0}")]
    AuthorizationDenied(String),

    /// The callback `state` is missing or differs from the one issued.
    #[error("authorization state mismatch, restart the login")]
    StateMismatch,

    #[error("authorization callback carries no code")]
    MissingCode,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("no access token held, authenticate first")]
    NotAuthenticated,

    #[error("access token expired and cannot be refreshed")]
    TokenExpired,

    /// Non-2xx answer from a resource call. The body is kept verbatim.
    #[error("api request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn exchange(msg: impl Into<String>) -> Self {
        Self::TokenExchangeFailed(msg.into())
    }

    /// Status code of a failed resource call, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the flow has to start over from a fresh authorization URL.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied(_)
                | Self::StateMismatch
                | Self::MissingCode
                | Self::NotAuthenticated
                | Self::TokenExpired
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
