//! Backend selection at session open.

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::file::FileBackend;
use crate::relational::RelationalBackend;
use crate::session::Session;

/// Picks the backend for a session.
pub struct ConnectionManager;

impl ConnectionManager {
    /// Open a session. Never fails.
    ///
    /// Tries the relational store once. If it is not configured, cannot be
    /// reached, rejects the credentials or fails to bootstrap its schema, the
    /// session uses the file store for its whole lifetime and keeps the reason
    /// for diagnostics. There is no retry and no later switch back.
    pub async fn open(config: &StoreConfig) -> Session {
        let attempt = match &config.relational {
            Ok(relational) => RelationalBackend::connect(relational, config.connect_timeout)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match attempt {
            Ok(backend) => {
                info!("Using relational store");
                Session::new(Box::new(backend))
            }
            Err(reason) => {
                warn!("Relational store unavailable: {}", reason);
                warn!(
                    "Using local file-based fallback store at {}",
                    config.data_dir.display()
                );
                let backend = FileBackend::open(&config.data_dir).await;
                Session::degraded(Box::new(backend), reason)
            }
        }
    }
}

/// Open a session with [`ConnectionManager::open`].
pub async fn open(config: &StoreConfig) -> Session {
    ConnectionManager::open(config).await
}
