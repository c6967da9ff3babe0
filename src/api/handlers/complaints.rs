//! HTTP handlers for complaint reports and the admin complaint listing.

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{Multipart, Query, State},
    response::Redirect,
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    api::handlers::{read_file_field, redirect_with_msg},
    api::models::{complaints::ComplaintResponse, pagination::Pagination},
    db::{
        errors::DbError,
        handlers::{complaints::ComplaintFilter, Complaints, Repository, Users},
        models::complaints::ComplaintCreateDBRequest,
    },
    errors::{Error, Result},
    swachhata::ComplaintSubmission,
    AppState,
};

/// Parsed multipart report form.
#[derive(Debug, Default)]
struct ReportForm {
    mobile_number: Option<String>,
    category_id: Option<i64>,
    address: Option<String>,
    description: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    file: Option<(String, Vec<u8>)>,
}

impl ReportForm {
    async fn from_multipart(mut multipart: Multipart, max_image_size: u64) -> Result<Self> {
        let mut form = ReportForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to parse multipart data: {e}"),
        })? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or("upload.jpg").to_string();
                    let bytes = read_file_field(field, max_image_size).await?;
                    form.file = Some((filename, bytes));
                }
                _ => {
                    let value = field.text().await.map_err(|e| Error::BadRequest {
                        message: format!("Failed to read field '{name}': {e}"),
                    })?;
                    match name.as_str() {
                        "mobile_number" => form.mobile_number = Some(value),
                        "category_id" => {
                            form.category_id = Some(value.parse().map_err(|_| Error::BadRequest {
                                message: format!("category_id must be an integer, got '{value}'"),
                            })?)
                        }
                        "address" => form.address = Some(value),
                        "description" => form.description = Some(value).filter(|v| !v.is_empty()),
                        "latitude" => form.latitude = value.parse().ok(),
                        "longitude" => form.longitude = value.parse().ok(),
                        // Unknown fields are ignored, matching lenient form handling
                        _ => {}
                    }
                }
            }
        }

        Ok(form)
    }

    fn require(self) -> Result<(String, i64, String, Option<String>, f64, f64, (String, Vec<u8>))> {
        let missing = |field: &str| Error::BadRequest {
            message: format!("missing required field '{field}'"),
        };
        Ok((
            self.mobile_number.ok_or_else(|| missing("mobile_number"))?,
            self.category_id.ok_or_else(|| missing("category_id"))?,
            self.address.ok_or_else(|| missing("address"))?,
            self.description,
            self.latitude.unwrap_or(0.0),
            self.longitude.unwrap_or(0.0),
            self.file.ok_or_else(|| missing("file"))?,
        ))
    }
}

/// Reduce an uploaded filename to a safe basename and make it unique.
fn stored_filename(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.jpg".to_string());
    format!("{}_{}", Uuid::new_v4(), base)
}

/// Handle the complaint report form.
///
/// The photo is stored locally and the complaint recorded as `pending_sync`
/// before the upstream submission is attempted; upstream failure leaves the
/// complaint queued rather than failing the request.
#[tracing::instrument(skip_all)]
pub async fn submit_report(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    let (mobile_number, category_id, address, description, latitude, longitude, (filename, image)) =
        ReportForm::from_multipart(multipart, state.config.uploads.max_image_size)
            .await?
            .require()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let Some(user) = Users::new(&mut conn).get_by_mobile(&mobile_number).await? else {
        return Ok(redirect_with_msg("/register", "Error: Mobile number not found"));
    };

    let stored = stored_filename(&filename);
    let image_path = state.config.uploads.dir.join(&stored);
    tokio::fs::write(&image_path, &image).await.context("writing uploaded image")?;

    let mut complaints = Complaints::new(&mut conn);
    let complaint = complaints
        .create(&ComplaintCreateDBRequest {
            user_id: user.id,
            category_id,
            latitude,
            longitude,
            address: address.clone(),
            landmark: None,
            image_url: format!("/static/uploads/{stored}"),
            description,
        })
        .await?;

    let submission = ComplaintSubmission {
        mobile_number,
        category_id,
        latitude,
        longitude,
        address,
        image_path,
    };
    match state.swachhata.post_complaint(&submission).await {
        Ok(ticket_id) => {
            complaints.mark_synced(complaint.id, &ticket_id).await?;
        }
        Err(e) => {
            warn!(complaint_id = complaint.id, error = %e, "upstream submission failed, complaint left pending");
        }
    }

    Ok(redirect_with_msg("/", "Report Submitted Successfully!"))
}

/// List complaints, newest first.
#[utoipa::path(
    get,
    path = "/complaints",
    tag = "admin",
    params(Pagination),
    responses(
        (status = 200, description = "Complaints, newest first", body = [ComplaintResponse])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ComplaintResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut complaints = Complaints::new(&mut conn);

    let listed = complaints.list(&ComplaintFilter::new(pagination.skip, pagination.limit)).await?;
    Ok(Json(listed.into_iter().map(ComplaintResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::stored_filename;
    use crate::{api::models::users::RegisterForm, test_utils::create_test_app};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

    async fn register(server: &TestServer, mobile: &str) {
        let response = server
            .post("/register")
            .form(&RegisterForm {
                full_name: "Asha Rao".to_string(),
                mobile_number: mobile.to_string(),
            })
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
    }

    fn report_form(mobile: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("mobile_number", mobile)
            .add_text("category_id", "2")
            .add_text("address", "MG Road")
            .add_text("description", "bin overflowing since Monday")
            .add_text("latitude", "12.97")
            .add_text("longitude", "77.59")
            .add_part(
                "file",
                Part::bytes(JPEG_HEADER.to_vec()).file_name("evidence.jpg").mime_type("image/jpeg"),
            )
    }

    #[tokio::test]
    async fn report_from_registered_user_is_stored_and_synced() {
        let server = create_test_app().await;
        register(&server, "9876543210").await;

        let response = server.post("/report").multipart(report_form("9876543210")).await;
        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.contains("Report+Submitted"));

        let listing = server.get("/admin/api/v1/complaints").await;
        let complaints: serde_json::Value = listing.json();
        assert_eq!(complaints.as_array().unwrap().len(), 1);
        assert_eq!(complaints[0]["category_id"], 2);
        assert_eq!(complaints[0]["category_name"], "Overflowing Dustbin");
        assert_eq!(complaints[0]["status"], "synced");
        // Simulated upstream tickets are 'C' plus ten characters
        let ticket = complaints[0]["swachhata_complaint_id"].as_str().unwrap();
        assert!(ticket.starts_with('C') && ticket.len() == 11);
        assert!(complaints[0]["image_url"].as_str().unwrap().starts_with("/static/uploads/"));
    }

    #[tokio::test]
    async fn report_from_unknown_mobile_redirects_to_register() {
        let server = create_test_app().await;

        let response = server.post("/report").multipart(report_form("0000000000")).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.starts_with("/register?msg="));
        assert!(location.contains("not+found"));

        let listing = server.get("/admin/api/v1/complaints").await;
        let complaints: serde_json::Value = listing.json();
        assert!(complaints.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_without_file_is_rejected() {
        let server = create_test_app().await;
        register(&server, "9876543210").await;

        let form = MultipartForm::new()
            .add_text("mobile_number", "9876543210")
            .add_text("category_id", "2")
            .add_text("address", "MG Road");
        let response = server.post("/report").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("file"));
    }

    #[tokio::test]
    async fn uploaded_image_is_served_back() {
        let server = create_test_app().await;
        register(&server, "9876543210").await;
        server.post("/report").multipart(report_form("9876543210")).await;

        let listing = server.get("/admin/api/v1/complaints").await;
        let complaints: serde_json::Value = listing.json();
        let image_url = complaints[0]["image_url"].as_str().unwrap();

        let image = server.get(image_url).await;
        image.assert_status(StatusCode::OK);
        assert_eq!(image.as_bytes().as_ref(), JPEG_HEADER);
    }

    #[test]
    fn stored_filename_strips_directories() {
        let name = stored_filename("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(name.ends_with("_passwd"));
    }
}
