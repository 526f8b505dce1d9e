use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::{CacheError, SnapshotCache};

/// Redis 实现，每次操作取一条多路复用连接
#[derive(Clone)]
pub struct RedisCache {
    client: Arc<RedisClient>,
}

impl RedisCache {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    pub fn open(redis_url: &str) -> Result<Self, CacheError> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl SnapshotCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // SETEX 不接受 0 秒
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = conn.del(key).await?;
        tracing::debug!("DEL {} removed {} key(s)", key, removed);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
