//! Shared identifier and status types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type UserId = i64;
pub type ComplaintId = i64;

/// Sync lifecycle of a complaint with the upstream Swachhata API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Recorded locally, not yet accepted upstream
    PendingSync,
    /// Accepted upstream, ticket id stored
    Synced,
    /// Upstream rejected the complaint
    Failed,
    /// Marked resolved by the municipality
    Resolved,
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplaintStatus::PendingSync => "Pending Sync",
            ComplaintStatus::Synced => "Synced",
            ComplaintStatus::Failed => "Failed",
            ComplaintStatus::Resolved => "Resolved",
        };
        write!(f, "{s}")
    }
}
