mod common;

use common::{MockSpotify, REDIRECT_URI, TOKEN_PATH};
use pretty_assertions::assert_eq;
use reqwest::Method;
use spotgate::{
    AuthState, Authenticator, Error, ProviderConfig, TokenStore, types::CallbackParams,
};
use std::time::{Duration, Instant};
use url::Url;

const EXPECTED_BASIC: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

const TOKEN_BODY: &str = r#"{
    "access_token": "T",
    "token_type": "Bearer",
    "expires_in": 3600,
    "refresh_token": "R",
    "scope": "user-read-email"
}"#;

fn callback(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> CallbackParams {
    CallbackParams {
        code: code.map(str::to_string),
        state: state.map(str::to_string),
        error: error.map(str::to_string),
    }
}

#[tokio::test]
async fn test_auth_url_contains_flow_parameters() {
    let config = ProviderConfig::new("client-id", "client-secret")
        .with_redirect_uri(REDIRECT_URI)
        .with_scopes(["user-read-email", "playlist-modify-public"]);
    let auth = Authenticator::new(config).unwrap();

    let url = auth.auth_url("abc123").unwrap();
    let params: std::collections::HashMap<String, String> =
        url.query_pairs().into_owned().collect();

    assert_eq!(url.host_str(), Some("accounts.spotify.com"));
    assert_eq!(url.path(), "/authorize");
    assert_eq!(params["client_id"], "client-id");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], REDIRECT_URI);
    assert_eq!(params["scope"], "user-read-email playlist-modify-public");
    assert_eq!(params["state"], "abc123");

    // Same input, same URL
    assert_eq!(auth.auth_url("abc123").unwrap(), url);
}

#[tokio::test]
async fn test_auth_url_omits_empty_scope() {
    let config = ProviderConfig::new("client-id", "client-secret").with_scopes(Vec::<String>::new());
    let auth = Authenticator::new(config).unwrap();

    let url = auth.auth_url("s").unwrap();
    assert!(url.query_pairs().all(|(k, _)| k != "scope"));
}

#[tokio::test]
async fn test_begin_authorization_awaits_callback() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();
    assert_eq!(auth.state().await, AuthState::Unauthenticated);

    let (url, state) = auth.begin_authorization().await.unwrap();

    assert_eq!(state.len(), spotgate::utils::STATE_LENGTH);
    assert!(url.query_pairs().any(|(k, v)| k == "state" && v == state));
    assert_eq!(auth.state().await, AuthState::AwaitingCallback);
}

#[tokio::test]
async fn test_callback_exchanges_code() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, TOKEN_BODY);
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    let token = auth
        .handle_callback(&callback(Some("the-code"), Some(&state), None))
        .await
        .unwrap();

    assert_eq!(token.access_token, "T");
    assert_eq!(token.refresh_token.as_deref(), Some("R"));
    assert_eq!(auth.state().await, AuthState::Authenticated);

    let calls = mock.requests_to(TOKEN_PATH);
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.method, "POST");
    assert_eq!(call.header("authorization"), Some(EXPECTED_BASIC));
    assert_eq!(
        call.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );

    let form = call.form();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "the-code");
    assert_eq!(form["redirect_uri"], REDIRECT_URI);

    // The stored token is the one requests go out with
    let client = auth.authenticated_client();
    let request = client
        .request(Method::GET, Url::parse("http://localhost/v1/me").unwrap())
        .await
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        request.headers().get("authorization").unwrap(),
        "Bearer T"
    );
}

#[tokio::test]
async fn test_callback_state_mismatch_makes_no_exchange() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, TOKEN_BODY);
    let auth = Authenticator::new(mock.config()).unwrap();

    auth.begin_authorization().await.unwrap();
    let result = auth
        .handle_callback(&callback(Some("code"), Some("forged"), None))
        .await;

    assert!(matches!(result, Err(Error::StateMismatch)));
    assert_eq!(mock.token_calls(), 0);
    assert_eq!(auth.state().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_callback_missing_state_is_mismatch() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();

    auth.begin_authorization().await.unwrap();
    let result = auth.handle_callback(&callback(Some("code"), None, None)).await;

    assert!(matches!(result, Err(Error::StateMismatch)));
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_callback_without_issued_state_is_mismatch() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();

    let result = auth
        .handle_callback(&callback(Some("code"), Some("anything"), None))
        .await;

    assert!(matches!(result, Err(Error::StateMismatch)));
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_callback_error_is_denied() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    let result = auth
        .handle_callback(&callback(None, Some(&state), Some("access_denied")))
        .await;

    match result {
        Err(Error::AuthorizationDenied(reason)) => assert_eq!(reason, "access_denied"),
        other => panic!("expected denial, got {:?}", other),
    }
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_callback_without_code() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    let result = auth.handle_callback(&callback(None, Some(&state), None)).await;

    assert!(matches!(result, Err(Error::MissingCode)));
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_state_is_consumed_by_callback() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, TOKEN_BODY);
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    auth.handle_callback(&callback(Some("code"), Some(&state), None))
        .await
        .unwrap();

    // Replaying the same redirect must not exchange again
    let replay = auth
        .handle_callback(&callback(Some("code"), Some(&state), None))
        .await;
    assert!(matches!(replay, Err(Error::StateMismatch)));
    assert_eq!(mock.token_calls(), 1);
}

#[tokio::test]
async fn test_token_endpoint_rejection_fails_exchange() {
    let mock = MockSpotify::start().await;
    mock.respond(
        "POST",
        TOKEN_PATH,
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
    );
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    let result = auth
        .handle_callback(&callback(Some("bad"), Some(&state), None))
        .await;

    match result {
        Err(Error::TokenExchangeFailed(msg)) => assert!(msg.contains("invalid_grant")),
        other => panic!("expected exchange failure, got {:?}", other),
    }
    assert_eq!(auth.state().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_undecodable_token_body_fails_exchange() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, r#"{"unexpected":true}"#);
    let auth = Authenticator::new(mock.config()).unwrap();

    let result = auth.exchange_code("code").await;
    assert!(matches!(result, Err(Error::TokenExchangeFailed(_))));
    assert!(auth.store().current().await.is_none());
}

#[tokio::test]
async fn test_handle_callback_url() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, TOKEN_BODY);
    let auth = Authenticator::new(mock.config()).unwrap();

    let (_, state) = auth.begin_authorization().await.unwrap();
    let url = Url::parse(&format!("{}?code=xyz&state={}", REDIRECT_URI, state)).unwrap();

    let token = auth.handle_callback_url(&url).await.unwrap();
    assert_eq!(token.access_token, "T");
    assert_eq!(mock.requests_to(TOKEN_PATH)[0].form()["code"], "xyz");
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token() {
    let mock = MockSpotify::start().await;
    mock.respond(
        "POST",
        TOKEN_PATH,
        200,
        r#"{"access_token":"T2","token_type":"Bearer","expires_in":3600}"#,
    );
    let auth = Authenticator::new(mock.config()).unwrap();
    auth.authenticate_with(common::expired_token("T1", Some("R1")))
        .await;
    assert_eq!(auth.state().await, AuthState::Expired);

    let token = auth.refresh().await.unwrap();

    assert_eq!(token.access_token, "T2");
    assert_eq!(token.refresh_token.as_deref(), Some("R1"));
    assert_eq!(auth.state().await, AuthState::Authenticated);

    let form = mock.requests_to(TOKEN_PATH)[0].form();
    assert_eq!(form["grant_type"], "refresh_token");
    assert_eq!(form["refresh_token"], "R1");
}

#[tokio::test]
async fn test_refresh_without_refresh_token() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();

    assert!(matches!(auth.refresh().await, Err(Error::NotAuthenticated)));

    auth.authenticate_with(common::expired_token("T1", None)).await;
    assert!(matches!(auth.refresh().await, Err(Error::TokenExpired)));
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_client_credentials_grant() {
    let mock = MockSpotify::start().await;
    mock.respond(
        "POST",
        TOKEN_PATH,
        200,
        r#"{"access_token":"APP","token_type":"Bearer","expires_in":3600}"#,
    );
    let auth = Authenticator::new(mock.config()).unwrap();

    let token = auth.client_credentials().await.unwrap();

    assert_eq!(token.access_token, "APP");
    assert!(token.refresh_token.is_none());

    let call = &mock.requests_to(TOKEN_PATH)[0];
    assert_eq!(call.header("authorization"), Some(EXPECTED_BASIC));
    assert_eq!(call.form()["grant_type"], "client_credentials");
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();
    auth.authenticate_with(common::token("T", Some("R"))).await;
    auth.begin_authorization().await.unwrap();

    auth.logout().await.unwrap();

    assert_eq!(auth.state().await, AuthState::Unauthenticated);
    assert!(matches!(
        auth.authenticated_client().token().await,
        Err(Error::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_authenticated_client_refuses_expired_token() {
    let mock = MockSpotify::start().await;
    let auth = Authenticator::new(mock.config()).unwrap();
    let client = auth
        .authenticate_with(common::expired_token("T", Some("R")))
        .await;

    let result = client
        .request(Method::GET, Url::parse("http://localhost/v1/me").unwrap())
        .await;
    assert!(matches!(result, Err(Error::TokenExpired)));
}

#[tokio::test]
async fn test_token_store_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("token.json");

    let store = TokenStore::with_cache(path.clone());
    assert_eq!(store.load().await.unwrap(), None);

    let token = common::token("T", Some("R"));
    store.replace(token.clone()).await;
    assert!(path.is_file());

    let reloaded = TokenStore::with_cache(path.clone());
    assert_eq!(reloaded.load().await.unwrap(), Some(token.clone()));
    assert_eq!(reloaded.current().await, Some(token));

    reloaded.clear().await.unwrap();
    assert!(!path.exists());
    assert_eq!(reloaded.current().await, None);

    // Clearing twice is fine
    reloaded.clear().await.unwrap();
}

#[tokio::test]
async fn test_token_store_expire_only_matching_token() {
    let store = TokenStore::new();
    store.replace(common::token("T", None)).await;

    store.expire("other").await;
    assert!(!store.current().await.unwrap().is_expired());

    store.expire("T").await;
    assert!(store.current().await.unwrap().is_expired());
}

#[tokio::test]
async fn test_hung_token_endpoint_times_out() {
    let mock = MockSpotify::start().await;
    mock.respond("POST", TOKEN_PATH, 200, TOKEN_BODY);
    mock.delay("POST", TOKEN_PATH, Duration::from_secs(5));
    let config = mock.config().with_timeout(Duration::from_millis(200));
    let auth = Authenticator::new(config).unwrap();

    let start = Instant::now();
    let result = auth.exchange_code("code").await;

    assert!(matches!(result, Err(Error::TokenExchangeFailed(_))));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(auth.store().current().await.is_none());
    assert_eq!(auth.state().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_concurrent_replaces_keep_cache_in_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let store = TokenStore::with_cache(path.clone());

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .replace(common::token(&format!("T{}", i), Some("R")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let cached = TokenStore::with_cache(path).load().await.unwrap();
    assert_eq!(cached, store.current().await);
}
