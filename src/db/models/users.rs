//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub mobile_number: String,
    pub full_name: String,
    /// Upstream id if registration with the Swachhata API succeeded before the
    /// local insert; `None` when the upstream sync failed or is deferred.
    pub swachhata_user_id: Option<i64>,
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub full_name: Option<String>,
    pub swachhata_user_id: Option<i64>,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub mobile_number: String,
    pub full_name: String,
    pub swachhata_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
