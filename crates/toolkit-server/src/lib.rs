#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod extract;
pub mod handler;

/// Tracing target for multipart ingestion.
pub const TRACING_TARGET_UPLOAD: &str = "toolkit_server::upload";

/// Tracing target for JSON decoding.
pub const TRACING_TARGET_JSON: &str = "toolkit_server::json";

/// Tracing target for file downloads.
pub const TRACING_TARGET_DOWNLOAD: &str = "toolkit_server::download";

/// Tracing target for rendered error responses.
pub const TRACING_TARGET_RESPONSE: &str = "toolkit_server::response";

pub use crate::config::{JsonConfig, UploadConfig};
pub use crate::handler::{Error, JsonResponse, Result};
