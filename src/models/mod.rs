mod employee;
pub mod user;

pub use employee::{DEFAULT_EMPLOYEES, Employee};
pub use user::{User, validate_new_user};
