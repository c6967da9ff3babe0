//! Database models for complaints.

use crate::types::{ComplaintId, ComplaintStatus, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new complaint
#[derive(Debug, Clone)]
pub struct ComplaintCreateDBRequest {
    pub user_id: UserId,
    pub category_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    /// Path under the uploads mount, e.g. `/static/uploads/<name>`. The
    /// upstream API takes a URL string, not binary content.
    pub image_url: String,
    pub description: Option<String>,
}

/// Database request for updating a complaint's sync state
#[derive(Debug, Clone, Default)]
pub struct ComplaintUpdateDBRequest {
    pub status: Option<ComplaintStatus>,
    pub swachhata_complaint_id: Option<String>,
}

/// Database response for a complaint
#[derive(Debug, Clone)]
pub struct ComplaintDBResponse {
    pub id: ComplaintId,
    pub user_id: UserId,
    pub category_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    pub image_url: String,
    pub description: Option<String>,
    pub swachhata_complaint_id: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}
