//! Filesystem locations used by the routes.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Directories uploads are written to and downloads are served from.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Directory that receives uploaded files. Created on first upload.
    #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
    pub upload_dir: PathBuf,

    /// Directory `GET /download/{file}` serves files from.
    #[arg(long, env = "STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,
}

impl StorageConfig {
    /// Logs the configured directories.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            upload_dir = %self.upload_dir.display(),
            static_dir = %self.static_dir.display(),
            "Storage configuration"
        );
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            static_dir: PathBuf::from("./static"),
        }
    }
}
