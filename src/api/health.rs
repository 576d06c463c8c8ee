use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::{api::CallbackState, spotify::AuthState};

pub async fn health(Extension(state): Extension<CallbackState>) -> Json<Value> {
    let auth = match state.authenticator.state().await {
        AuthState::Unauthenticated => "unauthenticated",
        AuthState::AwaitingCallback => "awaiting_callback",
        AuthState::Authenticated => "authenticated",
        AuthState::Expired => "expired",
    };

    Json(json!({
        "status": "ok",
        "auth": auth,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
