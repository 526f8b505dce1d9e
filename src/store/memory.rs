use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{EmployeeStore, StoreError, UserStore};
use crate::models::{DEFAULT_EMPLOYEES, Employee, User, validate_new_user};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    employees: Vec<Employee>,
    next_user_id: i32,
    next_employee_id: i32,
}

/// 进程内存储，用于测试和本地调试，可注入故障与延迟
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让 list_all / list_employees 返回 Unavailable
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 让 insert / seed_employees 返回 Unavailable
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 每次调用前的人为延迟
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// 当前用户条数，不受故障注入影响
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    async fn simulate_io(&self) {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("could not commit write".into()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // 持锁期间不会 panic，中毒时直接取回数据
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        self.simulate_io().await;
        self.check_reads()?;
        Ok(self.lock().users.clone())
    }

    async fn insert(&self, name: &str, email: &str) -> Result<User, StoreError> {
        validate_new_user(name, email)?;
        self.simulate_io().await;
        self.check_writes()?;

        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!(
                "email {} already exists",
                email
            )));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: name.to_string(),
            email: email.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.simulate_io().await;
        self.check_reads()?;
        Ok(self.lock().employees.clone())
    }

    async fn seed_employees(&self) -> Result<usize, StoreError> {
        self.simulate_io().await;
        self.check_writes()?;

        let mut tables = self.lock();
        if !tables.employees.is_empty() {
            return Ok(0);
        }
        for name in DEFAULT_EMPLOYEES {
            tables.next_employee_id += 1;
            let id = tables.next_employee_id;
            tables.employees.push(Employee {
                id,
                name: name.to_string(),
            });
        }
        Ok(DEFAULT_EMPLOYEES.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryStore::new();
        let alice = store.insert("Alice", "a@x.com").await.unwrap();
        let bob = store.insert("Bob", "b@x.com").await.unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(store.list_all().await.unwrap(), vec![alice, bob]);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert("Alice", "a@x.com").await.unwrap();
        let err = store.insert("Alicia", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn validation_runs_before_fault_injection() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = store.insert("", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn seeds_employees_once() {
        let store = MemoryStore::new();
        assert_eq!(store.seed_employees().await.unwrap(), 4);
        assert_eq!(store.seed_employees().await.unwrap(), 0);

        let employees = store.list_employees().await.unwrap();
        let names: Vec<_> = employees.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, DEFAULT_EMPLOYEES);
        assert_eq!(employees[0].id, 1);
    }
}
