//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite,
//! following the repository pattern: API handlers talk to repositories
//! ([`handlers`]), repositories run queries and return record structs
//! ([`models`]), and failures are categorized into [`errors::DbError`].
//!
//! Repositories are constructed from a connection or transaction, not from the
//! pool, so multi-statement flows stay atomic:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut users = Users::new(&mut tx);
//! let user = users.create(&request).await?;
//! tx.commit().await?;
//! ```
//!
//! Migrations live in `migrations/` and are run on startup via
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
