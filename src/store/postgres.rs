use async_trait::async_trait;
use sqlx::PgPool;

use super::{EmployeeStore, StoreError, UserStore};
use crate::models::{DEFAULT_EMPLOYEES, Employee, User, validate_new_user};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR NOT NULL UNIQUE
);
CREATE INDEX IF NOT EXISTS ix_users_name ON users (name);
CREATE TABLE IF NOT EXISTS employees (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL
);
CREATE INDEX IF NOT EXISTS ix_employees_name ON employees (name);
"#;

/// 基于 Postgres 连接池的存储实现
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 建表（已存在则跳过）
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn insert(&self, name: &str, email: &str) -> Result<User, StoreError> {
        validate_new_user(name, email)?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::debug!("Inserted user {}", user.id);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Failed to insert user: {:?}", e);
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT id, name FROM employees ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(employees)
    }

    async fn seed_employees(&self) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tracing::info!(
                "Employees table already contains {} records, skipping seed",
                existing
            );
            return Ok(0);
        }

        for name in DEFAULT_EMPLOYEES {
            sqlx::query("INSERT INTO employees (name) VALUES ($1)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(DEFAULT_EMPLOYEES.len())
    }
}
