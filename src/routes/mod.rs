pub mod employee;
pub mod status;
pub mod user;
