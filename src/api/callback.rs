use std::{sync::Arc, time::Duration};

use axum::{Extension, extract::Query, response::Html};
use tokio::{sync::Mutex, time::Instant};

use crate::{
    error::{Error, Result},
    spotify::Authenticator,
    types::{CallbackParams, Token},
    warning,
};

/// Shared between the callback route and the task waiting for the login.
#[derive(Debug, Clone)]
pub struct CallbackState {
    pub authenticator: Authenticator,
    outcome: Arc<Mutex<Option<Result<Token>>>>,
}

impl CallbackState {
    pub fn new(authenticator: Authenticator) -> Self {
        CallbackState {
            authenticator,
            outcome: Arc::new(Mutex::new(None)),
        }
    }

    /// Polls for the callback outcome until `max_wait` has passed.
    pub async fn wait(&self, max_wait: Duration) -> Option<Result<Token>> {
        let start = Instant::now();

        while start.elapsed() < max_wait {
            if let Some(outcome) = self.outcome.lock().await.take() {
                return Some(outcome);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        None
    }
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<CallbackState>,
) -> Html<&'static str> {
    let result = state.authenticator.handle_callback(&params).await;

    let page = match &result {
        Ok(_) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(Error::AuthorizationDenied(_)) => Html("<h4>Login was denied.</h4>"),
        Err(Error::StateMismatch) => Html("<h4>Login expired or was tampered with. Start again.</h4>"),
        Err(_) => Html("<h4>Login failed.</h4>"),
    };

    if let Err(e) = &result {
        warning!("Authorization callback failed: {}", e);
    }

    *state.outcome.lock().await = Some(result);
    page
}
