//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures
//!
//! # Surfaces
//!
//! - **Pages** (`/`, `/register`, `/report`, `/admin`): embedded static HTML
//! - **Forms** (`POST /register`, `POST /report`): browser form posts answered
//!   with `303` redirects carrying a `msg` banner
//! - **Detection** (`POST /detect-category`): multipart image upload answered
//!   with a category suggestion as JSON
//! - **Admin API** (`/admin/api/v1/*`): JSON listings consumed by the
//!   dashboard page; documented with OpenAPI at `/admin/docs`

pub mod handlers;
pub mod models;
