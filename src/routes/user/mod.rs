mod handler;
mod model;

pub use handler::{create_user, list_users};
pub use model::CreateUserRequest;
