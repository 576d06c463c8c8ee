use crate::{Authenticator, error, info, spotify::AuthState, success, warning};

pub async fn status() {
    let auth = super::authenticator().await;
    let Some(token) = auth.store().current().await else {
        info!("Not authenticated. Run spotgate auth");
        return;
    };

    match auth.state().await {
        AuthState::Expired if token.can_refresh() => {
            info!("Access token expired, it is refreshed on the next call.")
        }
        AuthState::Expired => warning!("Access token expired. Run spotgate auth"),
        _ => success!(
            "Authenticated, token valid for {} more minutes (scopes: {})",
            token.expires_in() / 60,
            token.scope.as_deref().unwrap_or("-")
        ),
    }
}

pub async fn logout() {
    let auth = super::authenticator().await;
    match auth.logout().await {
        Ok(()) => success!("Logged out, token cache removed."),
        Err(e) => error!("Cannot remove token cache: {}", e),
    }
}

/// Prints an app-only access token. The cached user token is left alone.
pub async fn client_token() {
    let auth = match Authenticator::new(super::provider_config()) {
        Ok(auth) => auth,
        Err(e) => error!("Cannot set up HTTP client. Err: {}", e),
    };

    let token = super::fetch("Requesting client credentials token...", auth.client_credentials()).await;
    println!("{}", token.access_token);
}

pub async fn me() {
    let api = super::api_client().await;
    let user = super::fetch("Fetching profile...", api.me()).await;

    info!("Id:      {}", user.id);
    info!("Name:    {}", user.display_name.as_deref().unwrap_or("-"));
    info!("Email:   {}", user.email.as_deref().unwrap_or("-"));
    info!("Country: {}", user.country.as_deref().unwrap_or("-"));
    info!("Product: {}", user.product.as_deref().unwrap_or("-"));
}
