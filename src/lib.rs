//! # nagardrishti: civic sanitation complaint portal
//!
//! Nagardrishti is a small web service for reporting civic sanitation issues.
//! Citizens register with a mobile number, photograph an issue, and submit a
//! complaint; the service stores the report locally and forwards it to the
//! upstream Swachhata grievance API. When a photo is selected on the report
//! form, the browser uploads it to `POST /detect-category` and pre-fills the
//! complaint category from the response.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer with SQLite (via SQLx) for persistence, so a single binary
//! and a single file on disk are a complete deployment.
//!
//! Three request surfaces share one router:
//!
//! - **Pages**: `/`, `/register`, `/report`, and `/admin` serve embedded
//!   static HTML; other `/static/*` paths fall through to the embedded asset
//!   handler, and uploaded complaint photos are served from disk under
//!   `/static/uploads`.
//! - **Forms**: `POST /register` and `POST /report` accept browser form posts
//!   and answer with `303` redirects carrying a `msg` banner, so the pages
//!   work without any client-side framework.
//! - **JSON**: `POST /detect-category` returns a category suggestion for an
//!   uploaded image, and `/admin/api/v1/*` serves the dashboard listings.
//!   These are documented with OpenAPI at `/admin/docs`.
//!
//! Upstream synchronization is best effort: complaints are recorded as
//! `pending_sync` first, and a failed Swachhata submission leaves them queued
//! instead of failing the citizen's request.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use nagardrishti::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = nagardrishti::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     nagardrishti::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod detection;
pub mod errors;
mod openapi;
mod static_assets;
pub mod swachhata;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, Level};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::{
    detection::{CategoryDetector, HeuristicDetector},
    openapi::ApiDoc,
    swachhata::SwachhataClient,
};

pub use types::{ComplaintId, ComplaintStatus, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub swachhata: Arc<dyn SwachhataClient>,
    pub detector: Arc<dyn CategoryDetector>,
}

/// Get the nagardrishti database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite pool, creating the database file when missing.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)
        .with_context(|| format!("invalid database url: {}", config.database.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await
        .context("connecting to database")?;

    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut cors = CorsLayer::new();

    if !config.cors_allowed_origins.is_empty() {
        let origins = config
            .cors_allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid CORS origin")?;
        cors = cors.allow_origin(origins).allow_methods(Any).allow_headers(Any);
    }

    Ok(cors)
}

/// Construct the application router with all routes and middleware.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Multipart framing overhead on top of the image itself; the per-file cap
    // is enforced while reading the field
    let upload_body_limit = (state.config.uploads.max_image_size as usize).saturating_mul(4);

    let admin_api = Router::new()
        .route("/users", get(api::handlers::users::list_users))
        .route("/complaints", get(api::handlers::complaints::list_complaints))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/", get(api::handlers::pages::home))
        .route(
            "/register",
            get(api::handlers::pages::register_page).post(api::handlers::users::register_user),
        )
        .route(
            "/report",
            get(api::handlers::pages::report_page)
                .post(api::handlers::complaints::submit_report)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/admin", get(api::handlers::pages::admin_page))
        .route(
            "/detect-category",
            post(api::handlers::detection::detect_category).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .with_state(state.clone())
        .nest("/admin/api/v1", admin_api)
        .nest_service("/static/uploads", ServeDir::new(&state.config.uploads.dir))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/admin/docs"))
        .fallback(get(api::handlers::pages::serve_embedded_asset));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations,
///    prepares the uploads directory, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting portal with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Self::with_pool(config, pool).await
    }

    /// Create an application over an existing pool (used by tests)
    pub async fn with_pool(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        migrator().run(&pool).await.context("running migrations")?;

        tokio::fs::create_dir_all(&config.uploads.dir)
            .await
            .with_context(|| format!("creating uploads directory {}", config.uploads.dir.display()))?;

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .swachhata(swachhata::create_client(&config.swachhata))
            .detector(Arc::new(HeuristicDetector))
            .build();

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Nagardrishti listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn healthz_is_ok() {
        let server = create_test_app().await;

        let response = server.get("/healthz").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let server = create_test_app().await;

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status(StatusCode::OK);

        let spec: serde_json::Value = response.json();
        assert!(spec["paths"].get("/detect-category").is_some());
    }
}
