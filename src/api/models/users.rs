//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Browser registration form body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterForm {
    pub full_name: String,
    pub mobile_number: String,
}

/// User as exposed on the admin API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub mobile_number: String,
    pub full_name: String,
    /// Upstream Swachhata identity, present once registration has synced
    pub swachhata_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            mobile_number: user.mobile_number,
            full_name: user.full_name,
            swachhata_user_id: user.swachhata_user_id,
            created_at: user.created_at,
        }
    }
}
