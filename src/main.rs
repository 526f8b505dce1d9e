use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use cached_users::{
    AppState,
    cache::{RedisCache, SnapshotCache},
    config::Config,
    router::create_router,
    service::{DirectorySettings, EmployeeDirectory, UserDirectory},
    store::PgStore,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("DATABASE_URL and REDIS_URL must be set");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.store_timeout())
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'cached_users';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let store = Arc::new(PgStore::new(pool.clone()));
    tracing::info!("Creating database tables...");
    store
        .ensure_schema()
        .await
        .expect("Failed to create database tables");

    // 设置 Redis 客户端，连不上时只记录，读路径会直接回落到数据库
    let cache = Arc::new(RedisCache::open(&config.redis_url).expect("Invalid REDIS_URL"));
    tracing::info!("Connecting to Redis...");
    match cache.ping().await {
        Ok(()) => tracing::info!("Connected to Redis successfully"),
        Err(e) => tracing::warn!("Failed to connect to Redis: {}", e),
    }

    // 设置应用状态
    let state = AppState {
        users: UserDirectory::new(
            store.clone(),
            cache,
            DirectorySettings::from_config(&config),
        ),
        employees: EmployeeDirectory::new(store, config.store_timeout()),
        config: config.clone(),
    };

    let router = create_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    tracing::info!("Closing database connection pool");
    pool.close().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
