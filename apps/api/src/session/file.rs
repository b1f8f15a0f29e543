use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ScreeningSession, SessionStore};

/// How often the background sweep looks for expired session files.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// One JSON file per session under a directory. Survives restarts of a
/// single instance. Expired files are deleted when next read and by a
/// periodic sweep of the whole directory.
pub struct FileSessionStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Deletes every session file in the directory that is expired or
    /// unreadable. Returns how many files were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("listing session directory {}", self.dir.display()))
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("listing session directory {}", self.dir.display()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if self.is_stale(&path).await {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => warn!("Could not remove session file {}: {e}", path.display()),
                }
            }
        }
        Ok(removed)
    }

    /// A file is stale when it has not been written within the TTL, or when
    /// its contents are expired or unreadable.
    async fn is_stale(&self, path: &Path) -> bool {
        let untouched = tokio::fs::metadata(path)
            .await
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > self.ttl);
        if untouched {
            return true;
        }

        match tokio::fs::read(path).await {
            Ok(raw) => serde_json::from_slice::<ScreeningSession>(&raw)
                .map(|session| session.is_expired(self.ttl))
                .unwrap_or(true),
            Err(_) => false,
        }
    }

    /// Runs `purge_expired` every `SWEEP_INTERVAL` (or every TTL, if shorter)
    /// until the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        let period = SWEEP_INTERVAL.min(self.ttl).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => info!("Removed {n} expired session files"),
                    Err(e) => warn!("Session sweep failed: {e:#}"),
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading session file {}", path.display()))
            }
        };

        let session: ScreeningSession = match serde_json::from_slice(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding unreadable session file {}: {e}", path.display());
                self.clear(id).await?;
                return Ok(None);
            }
        };

        if session.is_expired(self.ttl) {
            debug!("Session {id} expired; removing {}", path.display());
            self.clear(id).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn save(&self, id: Uuid, session: &ScreeningSession) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating session directory {}", self.dir.display()))?;

        let json = serde_json::to_vec(session).context("serializing session")?;
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing session file {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing session file {}", path.display()))?;
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing session file {}", path.display())),
        }
    }
}
