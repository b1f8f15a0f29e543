use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::{ScreeningSession, SessionStore};

/// Process-local store. Sessions expire `ttl` after their last save and are
/// purged lazily on the next access.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, (ScreeningSession, Instant)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn purge_expired(&self) {
        let now = Instant::now();
        self.sessions
            .write()
            .await
            .retain(|_, (_, expires_at)| *expires_at > now);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>> {
        self.purge_expired().await;
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .map(|(session, _)| session.clone()))
    }

    async fn save(&self, id: Uuid, session: &ScreeningSession) -> Result<()> {
        let expires_at = Instant::now() + self.ttl;
        self.sessions
            .write()
            .await
            .insert(id, (session.clone(), expires_at));
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_jd(jd: &str) -> ScreeningSession {
        ScreeningSession {
            job_description: jd.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let id = Uuid::new_v4();
        store.save(id, &session_with_jd("Rust engineer")).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.job_description, "Rust engineer");
        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_session() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let id = Uuid::new_v4();
        store.save(id, &session_with_jd("x")).await.unwrap();
        store.clear(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
        // clearing twice is fine
        store.clear(id).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expires_after_ttl() {
        let store = MemorySessionStore::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        store.save(id, &session_with_jd("x")).await.unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(store.load(id).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_extends_lifetime() {
        let store = MemorySessionStore::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        store.save(id, &session_with_jd("first")).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        store.save(id, &session_with_jd("second")).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.job_description, "second");
    }
}
