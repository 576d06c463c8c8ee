use log::{debug, warn};
use reqwest::{
    Method, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    error::{Error, Result},
    spotify::AuthenticatedClient,
    types::Token,
};

/// Query string of a resource call. A parameter with several values is sent
/// once, its values joined with commas.
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name=v1,v2,..`. Empty value lists are skipped.
    pub fn param<S: AsRef<str>>(mut self, name: &str, values: &[S]) -> Self {
        if values.is_empty() {
            return self;
        }

        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((name.to_string(), joined));
        self
    }

    pub fn single(self, name: &str, value: &str) -> Self {
        self.param(name, &[value])
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Request payload; decides the content type sent along.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Client for Spotify Web API resources.
///
/// Every call goes through [`request`](Self::request): build the URL from the
/// API base, attach the bearer token, send, check the status, decode the JSON.
/// The endpoint wrappers in this module's siblings only pick method, path,
/// query and body.
///
/// # Token handling
///
/// - An expired token is refreshed before sending when a refresh token is
///   held, otherwise the call fails with [`Error::TokenExpired`]
/// - A 401 answer marks the token expired; with a refresh token the client
///   refreshes once and retries the request once
///
/// Nothing else is retried and nothing is cached.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: AuthenticatedClient,
    base_url: Url,
}

impl ApiClient {
    pub fn new(client: AuthenticatedClient) -> Result<Self> {
        let base_url = Url::parse(&client.authenticator().config().api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "api url {} cannot carry resource paths",
                base_url
            )));
        }

        Ok(ApiClient { client, base_url })
    }

    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Full URL for a resource path given as segments, e.g. `["tracks", id]`.
    ///
    /// Each segment is percent-encoded on its own, so a `/` inside an id
    /// becomes `%2F` instead of a separator. Empty, `.` and `..` segments are
    /// refused since the URL would resolve to a different resource.
    pub fn endpoint(&self, path: &[&str], query: &Query) -> Result<Url> {
        if let Some(bad) = path.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidPayload(format!(
                "invalid resource path segment {:?}",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config("api url cannot carry resource paths"))?;
            segments.pop_if_empty();
            for segment in path {
                segments.push(segment);
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// Sends an authenticated request and decodes the JSON answer into `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] / [`Error::TokenExpired`] when no usable
    ///   token is available
    /// - [`Error::Api`] on any non-2xx answer, carrying status and raw body
    /// - [`Error::Decode`] when a 2xx body does not match `T`
    /// - [`Error::InvalidPayload`] when a path segment is empty, `.` or `..`
    /// - [`Error::Http`] on network failures and timeouts
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        query: &Query,
        body: Option<&Body>,
    ) -> Result<T> {
        let url = self.endpoint(path, query)?;
        let token = self.usable_token().await?;

        let response = self.send(method.clone(), url.clone(), body, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        let authenticator = self.client.authenticator();
        authenticator.store().expire(&token.access_token).await;

        if token.can_refresh() {
            warn!("Access token rejected for /{}, refreshing once", path.join("/"));
            match authenticator.refresh_if_stale(&token.access_token).await {
                Ok(fresh) => {
                    let retried = self.send(method, url, body, &fresh).await?;
                    return Self::decode(retried).await;
                }
                Err(e) => warn!("Token refresh failed: {}", e),
            }
        }

        Self::decode(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &[&str], query: &Query) -> Result<T> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &[&str], body: Value) -> Result<T> {
        self.request(Method::POST, path, &Query::new(), Some(&Body::Json(body)))
            .await
    }

    async fn usable_token(&self) -> Result<Token> {
        let authenticator = self.client.authenticator();
        let token = authenticator
            .store()
            .current()
            .await
            .ok_or(Error::NotAuthenticated)?;

        if !token.is_expired() {
            return Ok(token);
        }
        if !token.can_refresh() {
            return Err(Error::TokenExpired);
        }

        debug!("Access token expired, refreshing before request");
        authenticator.refresh_if_stale(&token.access_token).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Body>,
        token: &Token,
    ) -> Result<Response> {
        debug!("{} {}", method, url);

        let builder = self.client.authorize(method, url, token)?;
        let builder = match body {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Form(fields)) => builder.form(fields),
            None => builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json")),
        };

        Ok(builder.send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api { status, body });
        }

        serde_json::from_str(&body).map_err(Error::Decode)
    }
}
