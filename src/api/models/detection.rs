//! API response model for category detection.

use crate::detection::Suggestion;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Suggested category for an uploaded image.
///
/// `suggested_id` is a string because the report form applies it directly as
/// the value of the category `<select>` control.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectionResponse {
    pub suggested_id: String,
    pub name: String,
    pub confidence: f32,
}

impl From<Suggestion> for DetectionResponse {
    fn from(s: Suggestion) -> Self {
        Self {
            suggested_id: s.category.id.to_string(),
            name: s.category.name.to_string(),
            confidence: s.confidence,
        }
    }
}
