//! 用户列表的读穿缓存。
//!
//! 读：先查缓存，未命中时查库并回填快照。写：先写库，再删除快照，
//! 下一次读取会重新从库加载。缓存与存储之间不加锁也不开事务，
//! 并发读写时可能短暂读到写入前的快照，最长不超过 TTL。

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{cache_call, store_call};
use crate::cache::{CacheError, SnapshotCache};
use crate::config::{Config, DEFAULT_USERS_CACHE_KEY, DEFAULT_USERS_CACHE_TTL_SECS};
use crate::models::User;
use crate::store::{StoreError, UserStore};

/// 快照键、过期时间与外部调用超时
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub cache_key: String,
    pub cache_ttl: Duration,
    pub store_timeout: Duration,
    pub cache_timeout: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_USERS_CACHE_KEY.into(),
            cache_ttl: Duration::from_secs(DEFAULT_USERS_CACHE_TTL_SECS),
            store_timeout: Duration::from_secs(5),
            cache_timeout: Duration::from_millis(500),
        }
    }
}

impl DirectorySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_key: config.users_cache_key.clone(),
            cache_ttl: config.users_cache_ttl(),
            store_timeout: config.store_timeout(),
            cache_timeout: config.cache_timeout(),
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }
}

/// 写库成功但快照删除失败，旧数据可能一直留到 TTL 过期
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to invalidate cache key {key}: {source}")]
pub struct CacheInvalidationFailed {
    pub key: String,
    #[source]
    pub source: CacheError,
}

/// 创建结果：记录已落库，`invalidation` 附带快照删除的结果
#[derive(Debug)]
pub struct Created {
    pub user: User,
    pub invalidation: Result<(), CacheInvalidationFailed>,
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn SnapshotCache>,
    settings: DirectorySettings,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn UserStore>,
        cache: Arc<dyn SnapshotCache>,
        settings: DirectorySettings,
    ) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    /// 读取全部用户，优先走缓存
    pub async fn list_cached(&self) -> Result<Vec<User>, StoreError> {
        let key = self.settings.cache_key.as_str();

        if let Some(users) = self.read_snapshot(key).await {
            tracing::debug!("Cache hit for key: {}", key);
            return Ok(users);
        }

        tracing::debug!("Cache miss for key: {}, fetching from store", key);
        let users = store_call(self.settings.store_timeout, self.store.list_all()).await?;

        self.write_snapshot(key, &users).await;
        Ok(users)
    }

    /// 写入新用户并使快照失效
    pub async fn create(&self, name: &str, email: &str) -> Result<Created, StoreError> {
        let user = store_call(self.settings.store_timeout, self.store.insert(name, email)).await?;

        let key = self.settings.cache_key.as_str();
        let invalidation = cache_call(self.settings.cache_timeout, self.cache.delete(key))
            .await
            .map_err(|source| CacheInvalidationFailed {
                key: key.to_string(),
                source,
            });

        match &invalidation {
            Ok(()) => tracing::debug!("Cache invalidated for key: {}", key),
            Err(e) => tracing::error!(user_id = user.id, "{}", e),
        }

        Ok(Created { user, invalidation })
    }

    // 缓存故障、超时或内容无法解析都按未命中处理
    async fn read_snapshot(&self, key: &str) -> Option<Vec<User>> {
        let bytes = match cache_call(self.settings.cache_timeout, self.cache.get(key)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for key {}, falling back to store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<User>>(&bytes) {
            Ok(users) => Some(users),
            Err(e) => {
                tracing::warn!("Discarding undecodable snapshot under {}: {}", key, e);
                None
            }
        }
    }

    // 回填失败不影响读请求
    async fn write_snapshot(&self, key: &str, users: &[User]) {
        let payload = match serde_json::to_vec(users) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize users snapshot: {}", e);
                return;
            }
        };

        let ttl = self.settings.cache_ttl;
        match cache_call(self.settings.cache_timeout, self.cache.set(key, payload, ttl)).await {
            Ok(()) => tracing::debug!(
                "Data stored in cache for key: {} with expiry: {}s",
                key,
                ttl.as_secs()
            ),
            Err(e) => tracing::warn!("Failed to populate cache for key {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::store::MemoryStore;

    const KEY: &str = "users:all";

    fn directory() -> (Arc<MemoryStore>, Arc<MemoryCache>, UserDirectory) {
        directory_with(DirectorySettings::default())
    }

    fn directory_with(
        settings: DirectorySettings,
    ) -> (Arc<MemoryStore>, Arc<MemoryCache>, UserDirectory) {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let directory = UserDirectory::new(store.clone(), cache.clone(), settings);
        (store, cache, directory)
    }

    fn user(id: i32, name: &str, email: &str) -> User {
        User {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn alice_and_bob_round_trip_through_cache() {
        let (store, cache, directory) = directory();
        directory.create("Alice", "a@x.com").await.unwrap();
        directory.create("Bob", "b@x.com").await.unwrap();

        let expected = vec![user(1, "Alice", "a@x.com"), user(2, "Bob", "b@x.com")];
        assert_eq!(directory.list_cached().await.unwrap(), expected);
        assert!(cache.contains(KEY));

        // 第三次读取必须来自缓存：此时库已不可用
        store.fail_reads(true);
        assert_eq!(directory.list_cached().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn listing_reflects_every_create_exactly_once() {
        let (_store, _cache, directory) = directory();
        let mut created = Vec::new();
        for i in 0..10 {
            let result = directory
                .create(&format!("user{i}"), &format!("user{i}@x.com"))
                .await
                .unwrap();
            assert!(result.invalidation.is_ok());
            created.push(result.user);
            // 每次写入之间都读一次，确保快照被反复建立和删除
            assert_eq!(directory.list_cached().await.unwrap(), created);
        }
    }

    #[tokio::test]
    async fn successive_reads_are_identical() {
        let (_store, _cache, directory) = directory();
        directory.create("Alice", "a@x.com").await.unwrap();

        let first = directory.list_cached().await.unwrap();
        let second = directory.list_cached().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn create_removes_snapshot() {
        let (_store, cache, directory) = directory();
        directory.list_cached().await.unwrap();
        assert!(cache.contains(KEY));

        directory.create("Alice", "a@x.com").await.unwrap();
        assert_eq!(cache.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_failure_does_not_populate_cache() {
        let (store, cache, directory) = directory();
        store.fail_reads(true);

        let err = directory.list_cached().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!cache.contains(KEY));
    }

    #[tokio::test]
    async fn cache_outage_falls_through_to_store() {
        let (_store, cache, directory) = directory();
        directory.create("Alice", "a@x.com").await.unwrap();
        cache.fail_get(true);
        cache.fail_set(true);

        let users = directory.list_cached().await.unwrap();
        assert_eq!(users, vec![user(1, "Alice", "a@x.com")]);
        assert!(!cache.contains(KEY));
    }

    #[tokio::test]
    async fn failed_insert_leaves_cache_untouched() {
        let (store, cache, directory) = directory();
        directory.list_cached().await.unwrap();
        store.fail_writes(true);

        let err = directory.create("Alice", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(cache.contains(KEY));
    }

    #[tokio::test]
    async fn validation_error_is_not_wrapped() {
        let (store, _cache, directory) = directory();
        let err = directory.create("   ", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn failed_invalidation_is_reported_but_create_succeeds() {
        let (store, cache, directory) = directory();
        directory.list_cached().await.unwrap();
        cache.fail_delete(true);

        let created = directory.create("Alice", "a@x.com").await.unwrap();
        assert_eq!(created.user, user(1, "Alice", "a@x.com"));
        let failure = created.invalidation.unwrap_err();
        assert_eq!(failure.key, KEY);
        assert!(matches!(failure.source, CacheError::Unavailable(_)));
        assert_eq!(store.user_count(), 1);
        // 旧快照仍在，正是需要上报的情况
        assert!(cache.contains(KEY));
    }

    #[tokio::test]
    async fn undecodable_snapshot_is_treated_as_miss() {
        let (_store, cache, directory) = directory();
        directory.create("Alice", "a@x.com").await.unwrap();
        cache
            .set(KEY, b"{not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let users = directory.list_cached().await.unwrap();
        assert_eq!(users, vec![user(1, "Alice", "a@x.com")]);
        // 重新回填后可以正常解析
        let bytes = cache.get(KEY).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Vec<User>>(&bytes).unwrap(), users);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_expires_after_ttl() {
        let (store, cache, directory) =
            directory_with(DirectorySettings::default().with_ttl(Duration::from_secs(5)));
        directory.list_cached().await.unwrap();
        assert!(cache.contains(KEY));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(cache.contains(KEY));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!cache.contains(KEY));

        // 过期后绕过缓存直接写入的数据可以被读到
        store.insert("Alice", "a@x.com").await.unwrap();
        assert_eq!(directory.list_cached().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cache_read_counts_as_miss() {
        let (_store, cache, directory) = directory_with(
            DirectorySettings::default().with_cache_timeout(Duration::from_millis(100)),
        );
        directory.create("Alice", "a@x.com").await.unwrap();
        cache.set_latency(Duration::from_secs(1));

        let users = directory.list_cached().await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_is_unavailable() {
        let (store, cache, directory) = directory_with(
            DirectorySettings::default().with_store_timeout(Duration::from_secs(1)),
        );
        store.set_latency(Duration::from_secs(2));

        let err = directory.list_cached().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!cache.contains(KEY));

        let err = directory.create("Alice", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_invalidation_is_reported_as_timeout() {
        let (_store, cache, directory) = directory_with(
            DirectorySettings::default().with_cache_timeout(Duration::from_millis(100)),
        );
        cache.set_latency(Duration::from_secs(1));

        let created = directory.create("Alice", "a@x.com").await.unwrap();
        let failure = created.invalidation.unwrap_err();
        assert_eq!(failure.source, CacheError::Timeout(Duration::from_millis(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_both_succeed() {
        let (store, cache, directory) = directory();
        store.insert("Alice", "a@x.com").await.unwrap();
        store.set_latency(Duration::from_millis(20));

        let (first, second) = tokio::join!(directory.list_cached(), directory.list_cached());
        let expected = vec![user(1, "Alice", "a@x.com")];
        assert_eq!(first.unwrap(), expected);
        assert_eq!(second.unwrap(), expected);
        assert!(cache.contains(KEY));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_create_and_list_both_succeed() {
        let (store, cache, directory) = directory();
        directory.create("Alice", "a@x.com").await.unwrap();
        store.set_latency(Duration::from_millis(20));
        cache.set_latency(Duration::from_millis(5));

        let (created, listed) =
            tokio::join!(directory.create("Bob", "b@x.com"), directory.list_cached());
        let bob = created.unwrap().user;
        let listed = listed.unwrap();
        let alice = user(1, "Alice", "a@x.com");
        // 并发读可能看到写入前或写入后的集合，两者都可以接受
        assert!(listed == vec![alice.clone()] || listed == vec![alice.clone(), bob.clone()]);

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored, vec![alice, bob]);

        // 清掉可能残留的旧快照后，读到的必须是库里的完整集合
        cache.delete(KEY).await.unwrap();
        assert_eq!(directory.list_cached().await.unwrap(), stored);
    }

    #[tokio::test]
    async fn custom_key_is_honoured() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let directory = UserDirectory::new(
            store,
            cache.clone(),
            DirectorySettings::default().with_cache_key("collection:all"),
        );

        directory.list_cached().await.unwrap();
        assert!(cache.contains("collection:all"));
        assert!(!cache.contains(KEY));
    }
}
