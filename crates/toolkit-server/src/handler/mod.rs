//! Request and response helpers for axum handlers.

pub mod download;
mod error;
pub mod json;
pub mod response;
pub mod upload;

pub use crate::handler::download::{download_static_file, download_static_file_in};
pub use crate::handler::error::{Error, Result};
pub use crate::handler::json::{
    decode_json, error_json, error_json_with_status, read_json, write_json,
};
pub use crate::handler::response::JsonResponse;
pub use crate::handler::upload::{
    FileNaming, PartialUpload, UploadedFile, upload_files, upload_one_file,
};
