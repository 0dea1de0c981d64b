use std::time::Duration;

use async_trait::async_trait;
use omm_core::{BoxError, KeyValueStore};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tracing::{debug, info};

/// Saved booking progress kept as plain redis strings. Keys carry no expiry;
/// freshness is decided by the reader.
///
/// One managed connection is shared by every call and reconnects on its own.
#[derive(Clone)]
pub struct RedisProgressStore {
    conn: ConnectionManager,
}

impl RedisProgressStore {
    pub async fn connect(connection_string: &str) -> Result<Self, redis::RedisError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(3)
            .set_connection_timeout(Some(Duration::from_secs(2)));

        let client = redis::Client::open(connection_string)?;
        let conn = client.get_connection_manager_with_config(config).await?;
        info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisProgressStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BoxError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BoxError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        debug!("Progress stored: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a local redis: `cargo test -p omm-store -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_clones_share_one_connection() {
        let url = std::env::var("OMM__REDIS__URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".into());
        let store = RedisProgressStore::connect(&url).await.unwrap();
        let other = store.clone();

        for i in 0..50 {
            let key = format!("booking-progress-test-{}", i);
            store.set(&key, "{}").await.unwrap();
            assert_eq!(other.get(&key).await.unwrap().as_deref(), Some("{}"));
            other.delete(&key).await.unwrap();
        }
        assert!(store.get("booking-progress-test-0").await.unwrap().is_none());
    }
}
