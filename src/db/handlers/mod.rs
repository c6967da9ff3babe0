//! Repository implementations for CRUD operations.

pub mod complaints;
pub mod repository;
pub mod users;

pub use complaints::Complaints;
pub use repository::Repository;
pub use users::Users;
