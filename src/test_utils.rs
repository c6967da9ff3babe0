//! Test utilities for integration testing.

use std::str::FromStr;
use std::time::Duration;

use axum_test::TestServer;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::config::{Config, DatabaseConfig, SwachhataConfig, UploadsConfig};

pub fn create_test_config() -> Config {
    // Unique temp uploads dir per test app
    let uploads_dir = std::env::temp_dir().join(format!("nagardrishti-test-uploads-{}", Uuid::new_v4()));

    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        uploads: UploadsConfig {
            dir: uploads_dir,
            max_image_size: 1024 * 1024,
        },
        swachhata: SwachhataConfig::Simulated,
        cors_allowed_origins: Vec::new(),
    }
}

/// In-memory SQLite pool with migrations applied.
///
/// Pinned to a single connection that never recycles; each connection to
/// `:memory:` would otherwise see its own empty database.
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Full application over an in-memory database, as an axum-test server.
pub async fn create_test_app() -> TestServer {
    let config = create_test_config();
    let pool = create_test_pool().await;

    crate::Application::with_pool(config, pool)
        .await
        .expect("Failed to create application")
        .into_test_server()
}
