//! Shared pagination query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(default, deny_unknown_fields)]
pub struct Pagination {
    /// Number of records to skip
    pub skip: i64,
    /// Maximum number of records to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}
