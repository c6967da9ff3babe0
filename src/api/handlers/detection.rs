//! HTTP handler for image category detection.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::{
    api::handlers::read_file_field,
    api::models::detection::DetectionResponse,
    errors::{Error, Result},
    AppState,
};

/// Suggest a complaint category for an uploaded photo.
///
/// The report form calls this as soon as a file is picked, before the form is
/// submitted, so the user gets a pre-filled category to confirm or override.
#[utoipa::path(
    post,
    path = "/detect-category",
    tag = "detection",
    request_body(
        content_type = "multipart/form-data",
        description = "Image upload with a single part named 'file'"
    ),
    responses(
        (status = 200, description = "Suggested category", body = DetectionResponse),
        (status = 400, description = "Missing or unreadable file part"),
        (status = 413, description = "Image too large"),
        (status = 415, description = "Payload is not an image")
    )
)]
pub async fn detect_category(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<DetectionResponse>> {
    let max_image_size = state.config.uploads.max_image_size;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = read_file_field(field, max_image_size).await?;

        let suggestion = state.detector.detect(filename.as_deref(), content_type.as_deref(), &bytes)?;
        info!(
            filename = ?filename,
            size = bytes.len(),
            category_id = suggestion.category.id,
            confidence = suggestion.confidence,
            "category detected"
        );

        return Ok(Json(suggestion.into()));
    }

    Err(Error::BadRequest {
        message: "multipart body must contain a part named 'file'".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend((0..len).map(|i| (i % 251) as u8));
        bytes
    }

    #[tokio::test]
    async fn suggests_a_category_for_an_image() {
        let server = create_test_app().await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(png_bytes(512)).file_name("photo.png").mime_type("image/png"),
        );
        let response = server.post("/detect-category").multipart(form).await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert!(body["suggested_id"].is_string());
        assert!(body["name"].is_string());
        assert!(body["confidence"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn filename_hints_pick_the_matching_category() {
        let server = create_test_app().await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(png_bytes(128))
                .file_name("overflowing-dustbin.png")
                .mime_type("image/png"),
        );
        let response = server.post("/detect-category").multipart(form).await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["suggested_id"], "2");
        assert_eq!(body["name"], "Overflowing Dustbin");
    }

    #[tokio::test]
    async fn missing_file_part_is_rejected() {
        let server = create_test_app().await;

        let form = MultipartForm::new().add_text("something_else", "value");
        let response = server.post("/detect-category").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("file"));
    }

    #[tokio::test]
    async fn non_image_payload_is_rejected() {
        let server = create_test_app().await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"not an image".to_vec()).file_name("notes.txt").mime_type("text/plain"),
        );
        let response = server.post("/detect-category").multipart(form).await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let server = create_test_app().await;

        // Test config caps images at 1 MiB
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(png_bytes(2 * 1024 * 1024)).file_name("big.png").mime_type("image/png"),
        );
        let response = server.post("/detect-category").multipart(form).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
