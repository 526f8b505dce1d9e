use std::env;
use std::time::Duration;

/// 用户列表缓存的默认键
pub const DEFAULT_USERS_CACHE_KEY: &str = "users:all";
/// 用户列表缓存的默认过期时间（秒）
pub const DEFAULT_USERS_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub database_max_connections: u32,
    pub users_cache_key: String,
    pub users_cache_ttl_secs: u64,
    pub store_timeout_ms: u64,
    pub cache_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")
                .ok()
                .filter(|host| !host.trim().is_empty())
                .unwrap_or(defaults.server_host),
            server_port: parse_or("SERVER_PORT", defaults.server_port),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            users_cache_key: env::var("USERS_CACHE_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .unwrap_or(defaults.users_cache_key),
            // 允许 "60" 或 "60s"，0 和无法解析的值都回落到默认
            users_cache_ttl_secs: env::var("USERS_CACHE_TTL")
                .ok()
                .and_then(|v| v.trim().trim_end_matches('s').parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.users_cache_ttl_secs),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            cache_timeout_ms: parse_or("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
        })
    }

    pub fn users_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.users_cache_ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            redis_url: String::new(),
            server_host: "0.0.0.0".into(),
            server_port: 80,
            database_max_connections: 10,
            users_cache_key: DEFAULT_USERS_CACHE_KEY.into(),
            users_cache_ttl_secs: DEFAULT_USERS_CACHE_TTL_SECS,
            store_timeout_ms: 5000,
            cache_timeout_ms: 500,
        }
    }
}

// 解析失败或未设置时使用默认值
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
