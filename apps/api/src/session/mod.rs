//! Ephemeral, cookie-keyed screening sessions.
//!
//! A session holds the last job description and skill list the browser
//! submitted plus every candidate screened so far. Nothing outlives the
//! configured TTL; the stores differ only in where the JSON lives meanwhile.

pub mod cookie;
pub mod file;
pub mod memory;
pub mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, SessionBackend};
use crate::models::candidate::Candidate;

pub use self::cookie::SessionId;
pub use self::file::FileSessionStore;
pub use self::memory::MemorySessionStore;
pub use self::redis_store::RedisSessionStore;

/// Everything a browser session remembers between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSession {
    pub job_description: String,
    pub skills: String,
    pub candidates: Vec<Candidate>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScreeningSession {
    /// True when the session was last saved more than `ttl` ago.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let Some(updated_at) = self.updated_at else {
            return false;
        };
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => updated_at + ttl < Utc::now(),
            Err(_) => false,
        }
    }
}

/// Storage seam for screening sessions. Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>>;
    async fn save(&self, id: Uuid, session: &ScreeningSession) -> Result<()>;
    async fn clear(&self, id: Uuid) -> Result<()>;
}

/// Builds the store selected by `SESSION_BACKEND`.
pub async fn build_session_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    let ttl = Duration::from_secs(config.session_ttl_secs);
    let store: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Memory => {
            info!("Session store: in-memory (ttl {}s)", ttl.as_secs());
            Arc::new(MemorySessionStore::new(ttl))
        }
        SessionBackend::File => {
            info!(
                "Session store: files under {} (ttl {}s)",
                config.session_dir.display(),
                ttl.as_secs()
            );
            let store = Arc::new(FileSessionStore::new(config.session_dir.clone(), ttl));
            store.spawn_sweeper();
            store
        }
        SessionBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required for the redis session store")?;
            let store = RedisSessionStore::connect(url, ttl).await?;
            info!("Session store: redis (ttl {}s)", ttl.as_secs());
            Arc::new(store)
        }
    };
    Ok(store)
}
