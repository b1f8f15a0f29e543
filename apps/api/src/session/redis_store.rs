use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use uuid::Uuid;

use super::{ScreeningSession, SessionStore};

const KEY_PREFIX: &str = "screener:session:";

/// Sessions as JSON strings in Redis, expired by Redis itself (`SET ... EX`).
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid REDIS_URL")?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .context("connecting to redis")?;
        Ok(Self { conn, ttl })
    }
}

fn session_key(id: Uuid) -> String {
    format!("{KEY_PREFIX}{id}")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await
            .context("redis GET session")?;

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    tracing::warn!("Discarding unreadable session {id}: {e}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, id: Uuid, session: &ScreeningSession) -> Result<()> {
        let json = serde_json::to_string(session).context("serializing session")?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(session_key(id))
            .arg(json)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .context("redis SET session")?;
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(session_key(id))
            .query_async::<_, ()>(&mut conn)
            .await
            .context("redis DEL session")?;
        Ok(())
    }
}
