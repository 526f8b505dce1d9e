use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::StoreError;

/// 用户记录，id 由存储层分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// 检查新用户的字段，空白字符串视为空
pub fn validate_new_user(name: &str, email: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation("name must not be empty".into()));
    }
    if email.trim().is_empty() {
        return Err(StoreError::Validation("email must not be empty".into()));
    }
    Ok(())
}
