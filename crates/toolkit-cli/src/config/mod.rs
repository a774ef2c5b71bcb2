//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig    # Host, port, shutdown
//! ├── storage: StorageConfig  # Upload and static directories
//! ├── upload: UploadConfig    # Upload size cap, allowed types
//! ├── json: JsonConfig        # JSON size cap, unknown keys
//! └── remote: ReqwestConfig   # Outbound timeout, user agent
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.

mod server;
mod storage;

use std::process;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
pub use storage::StorageConfig;
use toolkit_reqwest::ReqwestConfig;
use toolkit_server::{JsonConfig, UploadConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "toolkit")]
#[command(about = "Upload, download and JSON helper demo server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Upload and static file directories.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Multipart upload limits.
    #[clap(flatten)]
    pub upload: UploadConfig,

    /// Strict JSON decoding settings.
    #[clap(flatten)]
    pub json: JsonConfig,

    /// Outbound JSON client settings.
    #[clap(flatten)]
    pub remote: ReqwestConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;

        anyhow::ensure!(
            self.upload.max_upload_size > 0,
            "invalid upload configuration: max upload size must be greater than 0"
        );
        anyhow::ensure!(
            self.json.max_body_size > 0,
            "invalid JSON configuration: max JSON size must be greater than 0"
        );

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.storage.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_upload_size = self.upload.max_upload_size,
            allowed_file_types = ?self.upload.allowed_file_types,
            max_json_size = self.json.max_body_size,
            allow_unknown_fields = self.json.allow_unknown_fields,
            remote_timeout_secs = self.remote.effective_timeout().as_secs(),
            "Handler configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
