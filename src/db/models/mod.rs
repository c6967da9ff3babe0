//! Database record and request structures.

pub mod complaints;
pub mod users;
