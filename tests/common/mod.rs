#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Extension, Router,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
};
use chrono::Utc;
use spotgate::{
    ProviderConfig,
    types::{EXPIRY_MARGIN_SECS, Token},
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const TOKEN_PATH: &str = "/api/token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, VecDeque<(u16, String)>>>>,
    rejected_tokens: Arc<Mutex<HashSet<String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

/// In-process stand-in for the Spotify accounts and Web API hosts.
///
/// Every request is recorded. Answers are queued per `METHOD /path`; the last
/// queued answer sticks once the queue is drained. Bearer tokens marked as
/// rejected get a 401 regardless of the queue. A route can be slowed down
/// with [`MockSpotify::delay`].
pub struct MockSpotify {
    pub base_url: String,
    state: MockState,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .fallback(handle)
            .layer(Extension(state.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockSpotify {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> ProviderConfig {
        ProviderConfig::new(CLIENT_ID, CLIENT_SECRET)
            .with_redirect_uri(REDIRECT_URI)
            .with_endpoints(
                format!("{}/authorize", self.base_url),
                format!("{}{}", self.base_url, TOKEN_PATH),
                format!("{}/v1", self.base_url),
            )
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.state
            .responses
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back((status, body.to_string()));
    }

    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.state
            .delays
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, path), delay);
    }

    pub fn reject_token(&self, access_token: &str) {
        self.state
            .rejected_tokens
            .lock()
            .unwrap()
            .insert(access_token.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn token_calls(&self) -> usize {
        self.requests_to(TOKEN_PATH).len()
    }
}

async fn handle(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Extension(state): Extension<MockState>,
    body: String,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    let query = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .into_owned()
        .collect();

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query,
        headers,
        body,
    });

    let key = format!("{} {}", method, path);
    let delay = state.delays.lock().unwrap().get(&key).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some(token) = bearer {
        if state.rejected_tokens.lock().unwrap().contains(&token) {
            return (
                StatusCode::UNAUTHORIZED,
                r#"{"error":{"status":401,"message":"The access token expired"}}"#.to_string(),
            );
        }
    }

    let mut responses = state.responses.lock().unwrap();
    let (status, body) = match responses.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
        Some(queue) if !queue.is_empty() => queue[0].clone(),
        _ => (404, r#"{"error":"no mock"}"#.to_string()),
    };

    (StatusCode::from_u16(status).unwrap(), body)
}

pub fn token(access_token: &str, refresh_token: Option<&str>) -> Token {
    Token {
        access_token: access_token.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        scope: None,
        expires_at: Utc::now().timestamp() + 3600,
        expiry_margin: EXPIRY_MARGIN_SECS,
    }
}

pub fn expired_token(access_token: &str, refresh_token: Option<&str>) -> Token {
    Token {
        expires_at: Utc::now().timestamp() - 10,
        ..token(access_token, refresh_token)
    }
}
