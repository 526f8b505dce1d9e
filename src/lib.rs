use config::Config;
use service::{EmployeeDirectory, UserDirectory};

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod result;
pub mod router;
pub mod routes;
pub mod service;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: UserDirectory,
    pub employees: EmployeeDirectory,
}
