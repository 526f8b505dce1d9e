//! 建表并在员工表为空时写入初始数据

use anyhow::Context;
use cached_users::{
    config::Config,
    store::{EmployeeStore, PgStore},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("DATABASE_URL and REDIS_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.store_timeout())
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool);

    store
        .ensure_schema()
        .await
        .context("failed to create tables")?;

    tracing::info!("Attempting to seed employees table...");
    let inserted = store
        .seed_employees()
        .await
        .context("failed to seed employees")?;
    if inserted > 0 {
        tracing::info!("Seeded employees table with {} records", inserted);
    }

    store.pool().close().await;
    Ok(())
}
