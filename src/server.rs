use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{
    api,
    error::{Error, Result},
};

pub fn router(state: api::CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::config(format!("invalid server address {}: {}", addr, e)))?;
    Ok(TcpListener::bind(addr).await?)
}

pub async fn serve(listener: TcpListener, state: api::CallbackState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
