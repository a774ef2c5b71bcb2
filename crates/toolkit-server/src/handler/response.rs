//! The uniform JSON envelope.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Envelope used for both success and error JSON bodies.
///
/// `data` is omitted from the serialized form when absent.
#[must_use = "responses do nothing unless serialized"]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value> {
    /// Whether the envelope reports a failure.
    pub error: bool,
    /// Human-readable message.
    pub message: String,
    /// Optional payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonResponse<T> {
    /// Creates a success envelope carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Creates a success envelope with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an error envelope with no payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    #[inline]
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
