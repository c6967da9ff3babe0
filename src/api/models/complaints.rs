//! API request/response models for complaints.

use crate::db::models::complaints::ComplaintDBResponse;
use crate::detection::category_name;
use crate::types::{ComplaintId, ComplaintStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Complaint as exposed on the admin API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintResponse {
    pub id: ComplaintId,
    pub user_id: UserId,
    pub category_id: i64,
    /// Human-readable category, resolved from the taxonomy
    pub category_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    /// Where the evidence photo is served from
    pub image_url: String,
    pub description: Option<String>,
    /// Upstream ticket id, present once the complaint has synced
    pub swachhata_complaint_id: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ComplaintDBResponse> for ComplaintResponse {
    fn from(c: ComplaintDBResponse) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            category_name: category_name(c.category_id).to_string(),
            category_id: c.category_id,
            latitude: c.latitude,
            longitude: c.longitude,
            address: c.address,
            landmark: c.landmark,
            image_url: c.image_url,
            description: c.description,
            swachhata_complaint_id: c.swachhata_complaint_id,
            status: c.status,
            created_at: c.created_at,
        }
    }
}
