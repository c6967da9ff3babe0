//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` and can be set via the
//! `-f` flag or the `NAGARDRISHTI_CONFIG` environment variable.
//!
//! Sources are merged in order (later overrides earlier):
//!
//! 1. YAML config file
//! 2. Environment variables prefixed with `NAGARDRISHTI_`, using double
//!    underscores for nesting (`NAGARDRISHTI_DATABASE__URL=...` sets
//!    `database.url`)
//!
//! ```bash
//! NAGARDRISHTI_PORT=8080
//! NAGARDRISHTI_DATABASE__URL="sqlite://./nagardrishti.db"
//! NAGARDRISHTI_SWACHHATA__MODE=simulated
//! ```

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "NAGARDRISHTI_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// SQLite database configuration
    pub database: DatabaseConfig,
    /// Storage for uploaded complaint photos
    pub uploads: UploadsConfig,
    /// Upstream Swachhata API client configuration
    pub swachhata: SwachhataConfig,
    /// Origins allowed by CORS; empty means same-origin only
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string; the file is created when missing
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./nagardrishti.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory complaint photos are written to, served at `/static/uploads`
    pub dir: PathBuf,
    /// Maximum accepted image size in bytes
    pub max_image_size: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_image_size: 10 * 1024 * 1024,
        }
    }
}

/// Upstream client selection.
///
/// `simulated` fabricates upstream ids locally; `http` talks to the real API
/// and requires vendor credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SwachhataConfig {
    Simulated,
    Http {
        base_url: Url,
        vendor_name: String,
        access_key: String,
    },
}

impl Default for SwachhataConfig {
    fn default() -> Self {
        SwachhataConfig::Simulated
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database: DatabaseConfig::default(),
            uploads: UploadsConfig::default(),
            swachhata: SwachhataConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("NAGARDRISHTI_").split("__"))
    }

    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.max_image_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_image_size must be greater than zero".to_string(),
            });
        }

        if let SwachhataConfig::Http { access_key, vendor_name, .. } = &self.swachhata {
            if access_key.is_empty() || vendor_name.is_empty() {
                return Err(Error::Internal {
                    operation: "Config validation: swachhata.access_key and swachhata.vendor_name are required in http mode"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
