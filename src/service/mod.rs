// 业务服务层
// 组合存储与缓存，对外提供用户列表读写与员工查询

mod employee;
mod user;

use std::future::Future;
use std::time::Duration;

use crate::cache::CacheError;
use crate::store::StoreError;

pub use employee::EmployeeDirectory;
pub use user::{CacheInvalidationFailed, Created, DirectorySettings, UserDirectory};

/// 限时调用存储，超时视为存储不可用
pub(crate) async fn store_call<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Unavailable(format!(
            "store call timed out after {:?}",
            limit
        ))),
    }
}

/// 限时调用缓存
pub(crate) async fn cache_call<T, F>(limit: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, CacheError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(limit)),
    }
}
