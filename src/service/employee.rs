use std::sync::Arc;
use std::time::Duration;

use super::store_call;
use crate::models::Employee;
use crate::store::{EmployeeStore, StoreError};

/// 员工列表直接查库，不经过缓存
#[derive(Clone)]
pub struct EmployeeDirectory {
    store: Arc<dyn EmployeeStore>,
    store_timeout: Duration,
}

impl EmployeeDirectory {
    pub fn new(store: Arc<dyn EmployeeStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        tracing::debug!("Fetching employees from store");
        store_call(self.store_timeout, self.store.list_employees()).await
    }
}
