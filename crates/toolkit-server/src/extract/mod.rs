//! Request extractors.

mod json;

pub use crate::extract::json::Json;
