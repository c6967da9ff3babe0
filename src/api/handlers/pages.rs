//! HTTP handlers for the embedded frontend pages and static assets.

use axum::{
    body::Body,
    http::{Response, StatusCode, Uri},
    response::IntoResponse,
};
use tracing::instrument;

use crate::static_assets::Assets;

/// Serve one embedded asset by name.
fn serve_asset(name: &str) -> Response<Body> {
    let Some(content) = Assets::get(name) else {
        return Response::builder().status(StatusCode::NOT_FOUND).body(Body::empty()).unwrap();
    };

    let mime = mime_guess::from_path(name).first_or_octet_stream();

    // Pages change with deployments and should not be cached; scripts and
    // styles can be held briefly
    let cache_control = if name.ends_with(".html") { "no-cache" } else { "public, max-age=3600" };

    Response::builder()
        .header(axum::http::header::CONTENT_TYPE, mime.as_ref())
        .header(axum::http::header::CACHE_CONTROL, cache_control)
        .body(Body::from(content.data.into_owned()))
        .unwrap()
}

pub async fn home() -> impl IntoResponse {
    serve_asset("index.html")
}

pub async fn register_page() -> impl IntoResponse {
    serve_asset("register.html")
}

pub async fn report_page() -> impl IntoResponse {
    serve_asset("report.html")
}

pub async fn admin_page() -> impl IntoResponse {
    serve_asset("admin.html")
}

/// Fallback handler for everything else, mainly `/static/*` asset paths.
#[instrument]
pub async fn serve_embedded_asset(uri: Uri) -> impl IntoResponse {
    let mut path = uri.path().trim_start_matches('/');
    path = path.strip_prefix("static/").unwrap_or(path);

    if path.is_empty() {
        path = "index.html";
    }

    serve_asset(path)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn home_serves_index_html() {
        let server = create_test_app().await;

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/html")
        );
        assert_eq!(
            response.headers().get("cache-control").map(|v| v.to_str().unwrap()),
            Some("no-cache")
        );
        assert!(response.text().contains("Nagardrishti"));
    }

    #[tokio::test]
    async fn report_page_hosts_the_detection_controls() {
        let server = create_test_app().await;

        let response = server.get("/report").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("imageUpload"));
        assert!(text.contains("categoryId"));
        assert!(text.contains("aiStatus"));
    }

    #[tokio::test]
    async fn static_scripts_are_served_with_js_mime() {
        let server = create_test_app().await;

        let response = server.get("/static/app.js").await;

        response.assert_status(StatusCode::OK);
        assert!(response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap())
            .unwrap()
            .contains("javascript"));
        assert!(response.text().contains("autoDetectCategory"));
    }

    #[tokio::test]
    async fn unknown_asset_is_404() {
        let server = create_test_app().await;

        let response = server.get("/static/missing.js").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
