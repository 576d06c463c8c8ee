use std::{path::PathBuf, sync::Arc};

use log::{debug, warn};
use tokio::sync::RwLock;

use crate::{
    error::{Error, Result},
    types::Token,
};

/// Holds the session's token pair behind an async lock, optionally mirrored to
/// a JSON cache file.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<Token>>>,
    cache_path: Option<PathBuf>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(path: PathBuf) -> Self {
        TokenStore {
            token: Arc::new(RwLock::new(None)),
            cache_path: Some(path),
        }
    }

    pub fn cache_path(&self) -> Option<&PathBuf> {
        self.cache_path.as_ref()
    }

    pub async fn current(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    /// Swaps in a new token. Cache write failures are logged, the in-memory
    /// token is replaced either way.
    ///
    /// The write guard is held until the cache file is written, so the file
    /// always ends up with the token that won in memory.
    pub async fn replace(&self, token: Token) {
        let mut lock = self.token.write().await;

        if let Err(e) = self.persist(&token).await {
            warn!("Failed to write token cache: {}", e);
        }
        *lock = Some(token);
    }

    /// Marks the held token as expired, unless it was already replaced by one
    /// with a different access token.
    pub async fn expire(&self, access_token: &str) {
        let mut lock = self.token.write().await;
        if let Some(token) = lock.as_mut() {
            if token.access_token == access_token {
                debug!("Marking access token as expired");
                token.expires_at = 0;
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        let mut lock = self.token.write().await;
        lock.take();

        if let Some(path) = &self.cache_path {
            match async_fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Loads the cached token into memory. A missing cache file is not an error.
    pub async fn load(&self) -> Result<Option<Token>> {
        let Some(path) = &self.cache_path else {
            return Ok(None);
        };

        let mut lock = self.token.write().await;
        let content = match async_fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token: Token = serde_json::from_str(&content).map_err(Error::Decode)?;
        *lock = Some(token.clone());
        Ok(Some(token))
    }

    async fn persist(&self, token: &Token) -> Result<()> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token).map_err(Error::Decode)?;
        async_fs::write(path, json).await?;
        Ok(())
    }
}
