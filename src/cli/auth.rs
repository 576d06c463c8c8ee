use std::time::Duration;

use crate::{api::CallbackState, config, error, info, server, success, utils, warning};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn auth() {
    let authenticator = super::authenticator().await;

    let addr = match config::server_addr(authenticator.config()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to resolve server address: {}", e),
    };
    let listener = match server::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot start callback server on {}. Err: {}", addr, e),
    };

    let state = CallbackState::new(authenticator.clone());
    let server_state = state.clone();
    let server = tokio::spawn(async move { server::serve(listener, server_state).await });

    let (url, _) = match authenticator.begin_authorization().await {
        Ok(issued) => issued,
        Err(e) => error!("Cannot build authorization URL: {}", e),
    };

    if webbrowser::open(url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    } else {
        info!("Continue the login in your browser.");
    }

    let pb = utils::spinner("Waiting for authorization callback...");
    let outcome = state.wait(CALLBACK_TIMEOUT).await;
    pb.finish_and_clear();
    server.abort();

    match outcome {
        Some(Ok(token)) => success!(
            "Authentication successful! Token valid for {} minutes.",
            token.expires_in() / 60
        ),
        Some(Err(e)) => error!("Authentication failed: {}", e),
        None => error!("Authentication timed out."),
    }
}
