//! OpenAPI documentation configuration.
//!
//! Served via RapiDoc at `/admin/docs`. Covers the JSON endpoints; the
//! browser form flows (`POST /register`, `POST /report`) answer with
//! redirects and are not part of the documented API surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nagardrishti API",
        description = "Category detection and admin listings for the civic complaint portal"
    ),
    paths(
        crate::api::handlers::detection::detect_category,
        crate::api::handlers::users::list_users,
        crate::api::handlers::complaints::list_complaints,
    ),
    components(schemas(
        crate::api::models::detection::DetectionResponse,
        crate::api::models::users::UserResponse,
        crate::api::models::complaints::ComplaintResponse,
        crate::types::ComplaintStatus,
    )),
    tags(
        (name = "detection", description = "Image category detection"),
        (name = "admin", description = "Dashboard listings under /admin/api/v1")
    )
)]
pub struct ApiDoc;
