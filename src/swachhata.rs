//! Client for the upstream Swachhata grievance API.
//!
//! Two implementations sit behind [`SwachhataClient`]: an HTTP client for the
//! real API and a simulated client for development, selected from
//! configuration by [`create_client`]. Callers treat upstream failures as
//! non-fatal: a complaint that cannot be synced stays at `pending_sync` and
//! the user-facing request still succeeds.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

use crate::config::SwachhataConfig;

/// Result type for upstream operations
pub type Result<T> = std::result::Result<T, SwachhataError>;

#[derive(Debug, thiserror::Error)]
pub enum SwachhataError {
    #[error("upstream API error: {0}")]
    Api(String),

    #[error("upstream request failed")]
    Http(#[from] reqwest::Error),

    #[error("could not read complaint image")]
    Image(#[from] std::io::Error),
}

/// A complaint ready for upstream submission.
#[derive(Debug, Clone)]
pub struct ComplaintSubmission {
    pub mobile_number: String,
    pub category_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    /// Local path of the stored evidence photo
    pub image_path: PathBuf,
}

#[async_trait]
pub trait SwachhataClient: Send + Sync {
    /// Register a citizen upstream; returns the upstream user id.
    async fn register_user(&self, full_name: &str, mobile_number: &str) -> Result<i64>;

    /// Submit a complaint upstream; returns the ticket id ("generic_id").
    async fn post_complaint(&self, submission: &ComplaintSubmission) -> Result<String>;
}

/// Create a client from configuration.
///
/// This is the single point where config turns into a client instance.
pub fn create_client(config: &SwachhataConfig) -> Arc<dyn SwachhataClient> {
    match config {
        SwachhataConfig::Simulated => Arc::new(SimulatedClient),
        SwachhataConfig::Http {
            base_url,
            vendor_name,
            access_key,
        } => Arc::new(HttpClient::new(base_url.clone(), vendor_name.clone(), access_key.clone())),
    }
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct ComplaintResponse {
    generic_id: String,
}

/// HTTP client against the real Swachhata API.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    vendor_name: String,
    access_key: String,
}

impl HttpClient {
    pub fn new(base_url: Url, vendor_name: String, access_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            vendor_name,
            access_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SwachhataError::Api(format!("invalid endpoint path {path}: {e}")))
    }
}

#[async_trait]
impl SwachhataClient for HttpClient {
    #[instrument(skip(self), err)]
    async fn register_user(&self, full_name: &str, mobile_number: &str) -> Result<i64> {
        let response = self
            .http
            .post(self.endpoint("users/register")?)
            .json(&serde_json::json!({
                "name": full_name,
                "mobile": mobile_number,
                "vendor": self.vendor_name,
                "key": self.access_key,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SwachhataError::Api(format!("registration returned {}", response.status())));
        }

        let body: RegisterResponse = response.json().await?;
        Ok(body.user_id)
    }

    #[instrument(skip(self, submission), fields(category_id = submission.category_id), err)]
    async fn post_complaint(&self, submission: &ComplaintSubmission) -> Result<String> {
        let image = tokio::fs::read(&submission.image_path).await?;
        let filename = submission
            .image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "complaint.jpg".to_string());

        let file_part = reqwest::multipart::Part::bytes(image)
            .file_name(filename)
            .mime_str("application/octet-stream")?;

        let form = reqwest::multipart::Form::new()
            .text("mobile", submission.mobile_number.clone())
            .text("category_id", submission.category_id.to_string())
            .text("complaintLatitude", submission.latitude.to_string())
            .text("complaintLongitude", submission.longitude.to_string())
            .text("complaintLocation", submission.address.clone())
            .text("vendor", self.vendor_name.clone())
            .text("key", self.access_key.clone())
            .part("file", file_part);

        let response = self.http.post(self.endpoint("complaints")?).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(SwachhataError::Api(format!("complaint post returned {}", response.status())));
        }

        let body: ComplaintResponse = response.json().await?;
        Ok(body.generic_id)
    }
}

/// Simulated client that fabricates plausible upstream ids.
///
/// Mirrors the shape of real responses so the rest of the service is
/// exercised end to end without network access.
pub struct SimulatedClient;

const TICKET_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[async_trait]
impl SwachhataClient for SimulatedClient {
    async fn register_user(&self, full_name: &str, mobile_number: &str) -> Result<i64> {
        info!(full_name, mobile_number, "simulated upstream registration");
        Ok(rand::thread_rng().gen_range(100_000..=999_999))
    }

    async fn post_complaint(&self, submission: &ComplaintSubmission) -> Result<String> {
        info!(
            category_id = submission.category_id,
            address = %submission.address,
            "simulated upstream complaint submission"
        );
        let mut rng = rand::thread_rng();
        let suffix: String = (0..10)
            .map(|_| TICKET_CHARSET[rng.gen_range(0..TICKET_CHARSET.len())] as char)
            .collect();
        Ok(format!("C{suffix}"))
    }
}
