//! 权威存储层：用户与员工记录

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Employee, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 调用方传入的字段不合法
    #[error("validation error: {0}")]
    Validation(String),

    /// 唯一约束冲突（邮箱重复）
    #[error("conflict: {0}")]
    Conflict(String),

    /// 连接失败、查询失败或超时
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

/// 用户集合的权威存储，需要支持多个调用方并发访问
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 返回全部用户，按 id 升序
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// 写入新用户并返回分配了 id 的记录
    async fn insert(&self, name: &str, email: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// 返回全部员工，按 id 升序
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    /// 员工表为空时写入默认数据，返回写入条数
    async fn seed_employees(&self) -> Result<usize, StoreError>;
}
