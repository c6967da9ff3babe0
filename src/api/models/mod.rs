//! API request/response models.

pub mod complaints;
pub mod detection;
pub mod pagination;
pub mod users;
