pub mod users_errors;
pub mod users_model;
pub mod users_repository;

pub use users_errors::{Result, UserError};
pub use users_model::{NewUser, User};
pub use users_repository::UserRepository;
