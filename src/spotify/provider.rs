use std::{fmt, time::Duration};

pub const AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-modify-playback-state",
    "app-remote-control",
    "streaming",
    "playlist-modify-private",
    "playlist-modify-public",
];

/// Fully resolved provider settings for one session.
///
/// Built once at startup, by hand or through [`crate::config::provider_config`],
/// and never mutated afterwards. The core reads no environment state itself.
#[derive(Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scopes: Vec<String>,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        ProviderConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            api_url: API_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Scopes in the space separated form the authorize endpoint expects.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("scopes", &self.scopes)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
