use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, header::AUTHORIZATION};
use tokio::sync::Mutex;
use url::Url;

use crate::{
    error::{Error, Result},
    management::TokenStore,
    spotify::ProviderConfig,
    types::{CallbackParams, Token, TokenResponse},
    utils,
};

/// Where a session stands in the authorization code flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AwaitingCallback,
    Authenticated,
    Expired,
}

/// Owner of the OAuth2 authorization code flow and of the session's token.
///
/// The authenticator builds the authorize URL, validates the callback against
/// the state it issued, talks to the token endpoint and is the only component
/// that replaces the token held in its [`TokenStore`]. Clones share the same
/// store, pending state and HTTP client, so one instance can be handed to the
/// callback server and the API client alike.
///
/// # Flow
///
/// 1. [`begin_authorization`](Self::begin_authorization) issues a random state
///    and returns the URL the user has to open
/// 2. Spotify redirects back with `code` and `state` (or `error`)
/// 3. [`handle_callback`](Self::handle_callback) checks the state, exchanges
///    the code and stores the token
/// 4. [`authenticated_client`](Self::authenticated_client) hands out a client
///    that attaches the bearer token to every request
///
/// # Example
///
/// ```
/// let auth = Authenticator::new(ProviderConfig::new(client_id, client_secret))?;
/// let (url, _state) = auth.begin_authorization().await?;
/// webbrowser::open(url.as_str())?;
/// // ... later, from the callback handler
/// let token = auth.handle_callback(&params).await?;
/// let api = ApiClient::new(auth.authenticated_client())?;
/// ```
#[derive(Debug, Clone)]
pub struct Authenticator {
    config: Arc<ProviderConfig>,
    http: Client,
    store: TokenStore,
    pending_state: Arc<Mutex<Option<String>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl Authenticator {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::with_store(config, TokenStore::new())
    }

    /// Creates an authenticator around an existing store, e.g. one backed by
    /// a token cache file.
    ///
    /// The shared HTTP client carries the configured request timeout, which
    /// bounds every token exchange and resource call.
    pub fn with_store(config: ProviderConfig, store: TokenStore) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Authenticator {
            config: Arc::new(config),
            http,
            store,
            pending_state: Arc::new(Mutex::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Builds the authorize endpoint URL for the given state.
    ///
    /// Pure function of the provider configuration and `state`: the same input
    /// always yields the same URL. Scopes are joined with spaces as Spotify
    /// expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the configured authorize URL does not parse.
    pub fn auth_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.auth_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.config.redirect_uri);
            if !self.config.scopes.is_empty() {
                query.append_pair("scope", &self.config.scope_param());
            }
            query.append_pair("state", state);
        }
        Ok(url)
    }

    /// Issues a fresh state token and returns the authorize URL embedding it.
    ///
    /// The state is remembered until the next callback. Starting a new
    /// authorization replaces any state issued before.
    pub async fn begin_authorization(&self) -> Result<(Url, String)> {
        let state = utils::generate_state();
        let url = self.auth_url(&state)?;

        *self.pending_state.lock().await = Some(state.clone());
        debug!("Issued authorization state, awaiting callback");

        Ok((url, state))
    }

    /// Validates an authorization callback and exchanges its code for a token.
    ///
    /// The pending state is consumed on every call, so a failed callback
    /// requires a new [`begin_authorization`](Self::begin_authorization).
    ///
    /// # Errors
    ///
    /// - [`Error::AuthorizationDenied`] if the callback carries an `error`
    /// - [`Error::StateMismatch`] if `state` is missing, no state was issued,
    ///   or the two differ
    /// - [`Error::MissingCode`] if the callback has no `code`
    /// - [`Error::TokenExchangeFailed`] if the token endpoint cannot be reached,
    ///   answers with a non-2xx status, or returns an undecodable body
    ///
    /// The first three fail without any network call.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<Token> {
        let issued = self.pending_state.lock().await.take();

        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            warn!("Authorization denied by provider: {}", error);
            return Err(Error::AuthorizationDenied(error.to_string()));
        }

        match (issued.as_deref(), params.state.as_deref()) {
            (Some(expected), Some(returned)) if expected == returned => {}
            _ => {
                warn!("Authorization callback state does not match the issued one");
                return Err(Error::StateMismatch);
            }
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(Error::MissingCode)?;

        self.exchange_code(code).await
    }

    /// Same as [`handle_callback`](Self::handle_callback) for a full callback
    /// URL such as `http://localhost:3000/callback?code=..&state=..`.
    pub async fn handle_callback_url(&self, url: &Url) -> Result<Token> {
        let mut params = CallbackParams::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        self.handle_callback(&params).await
    }

    /// Exchanges an authorization code for a user token and stores it.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        self.store.replace(token.clone()).await;
        info!("Authorization code exchanged for access token");
        Ok(token)
    }

    /// Obtains an app-only token through the client credentials grant.
    ///
    /// Such a token carries no user context: `/me` and playlist calls will be
    /// rejected by Spotify, catalog and search calls work.
    pub async fn client_credentials(&self) -> Result<Token> {
        let token = self
            .request_token(&[("grant_type", "client_credentials")])
            .await?;

        self.store.replace(token.clone()).await;
        Ok(token)
    }

    /// Exchanges the held refresh token for a new access token.
    ///
    /// Spotify may omit the refresh token in the answer, in which case the
    /// previous one is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] if no token is held
    /// - [`Error::TokenExpired`] if the held token has no refresh token
    /// - [`Error::TokenExchangeFailed`] if the token endpoint call fails
    pub async fn refresh(&self) -> Result<Token> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refreshes unless another caller already replaced the token that was
    /// seen as stale. Concurrent callers hitting a 401 with the same token end
    /// up with a single refresh.
    pub async fn refresh_if_stale(&self, seen_access_token: &str) -> Result<Token> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.current().await {
            if current.access_token != seen_access_token && !current.is_expired() {
                debug!("Token already refreshed by a concurrent caller");
                return Ok(current);
            }
        }

        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<Token> {
        let current = self.store.current().await.ok_or(Error::NotAuthenticated)?;
        let refresh_token = current.refresh_token.ok_or(Error::TokenExpired)?;

        let mut token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await?;

        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }

        self.store.replace(token.clone()).await;
        info!("Access token refreshed");
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Token> {
        let response = self
            .http
            .post(&self.config.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth(&self.config.client_id, &self.config.client_secret),
            )
            .form(form)
            .send()
            .await
            .map_err(|e| Error::exchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::exchange(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::exchange(format!(
                "token endpoint answered {}: {}",
                status, body
            )));
        }

        let res: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::exchange(format!("undecodable token response: {}", e)))?;

        Ok(Token::from_response(res, Utc::now().timestamp()))
    }

    /// Hands out a client bound to this authenticator's token.
    pub fn authenticated_client(&self) -> AuthenticatedClient {
        AuthenticatedClient {
            authenticator: self.clone(),
        }
    }

    /// Installs an externally obtained token, e.g. one loaded from a cache,
    /// and returns a client bound to it.
    pub async fn authenticate_with(&self, token: Token) -> AuthenticatedClient {
        self.store.replace(token).await;
        self.authenticated_client()
    }

    pub async fn state(&self) -> AuthState {
        if self.pending_state.lock().await.is_some() {
            return AuthState::AwaitingCallback;
        }

        match self.store.current().await {
            None => AuthState::Unauthenticated,
            Some(token) if token.is_expired() => AuthState::Expired,
            Some(_) => AuthState::Authenticated,
        }
    }

    /// Forgets the token, any pending state and the token cache file.
    pub async fn logout(&self) -> Result<()> {
        self.pending_state.lock().await.take();
        self.store.clear().await
    }
}

/// HTTP handle that attaches the session's bearer token to each request.
///
/// It never refreshes on its own; [`crate::spotify::ApiClient`] decides when
/// to ask the authenticator for a refresh.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    authenticator: Authenticator,
}

impl AuthenticatedClient {
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// The current token if it is present and not expired.
    pub async fn token(&self) -> Result<Token> {
        match self.authenticator.store.current().await {
            None => Err(Error::NotAuthenticated),
            Some(token) if token.is_expired() => Err(Error::TokenExpired),
            Some(token) => Ok(token),
        }
    }

    /// Starts a request carrying the current bearer token.
    pub async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.token().await?;
        self.authorize(method, url, &token)
    }

    /// Starts a request carrying `token`, refusing expired tokens.
    pub fn authorize(&self, method: Method, url: Url, token: &Token) -> Result<RequestBuilder> {
        if token.is_expired() {
            return Err(Error::TokenExpired);
        }

        Ok(self
            .authenticator
            .http
            .request(method, url)
            .bearer_auth(&token.access_token))
    }
}
