use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{CacheError, SnapshotCache};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// 进程内 TTL 缓存，用于测试，可模拟 Redis 故障
///
/// 过期时间基于 `tokio::time::Instant`，暂停时钟的测试可以直接推进时间。
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// 直接查看是否存在未过期的键，绕过故障注入
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .get(key)
            .is_some_and(|entry| entry.expires_at > now)
    }

    async fn simulate_io(&self) {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn outage(flag: &AtomicBool) -> Result<(), CacheError> {
    if flag.load(Ordering::SeqCst) {
        return Err(CacheError::Unavailable("connection reset by peer".into()));
    }
    Ok(())
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.simulate_io().await;
        outage(&self.fail_get)?;

        let now = Instant::now();
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.simulate_io().await;
        outage(&self.fail_set)?;

        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.simulate_io().await;
        outage(&self.fail_delete)?;

        self.lock().remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        outage(&self.fail_get)
    }
}
