// 缓存模块
// 保存用户列表快照，支持过期与显式删除

mod memory;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Unavailable(e.to_string())
    }
}

/// 键值缓存，值为不透明字节
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// 读取未过期的值，不存在时返回 `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// 写入值，`ttl` 后自动过期
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// 删除值，键不存在时什么也不做
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// 连通性检查
    async fn ping(&self) -> Result<(), CacheError>;
}
