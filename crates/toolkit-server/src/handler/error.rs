//! Handler error rendered as a JSON envelope.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use toolkit_core::ErrorKind;

use crate::TRACING_TARGET_RESPONSE;
use crate::handler::response::JsonResponse;

/// The error type for HTTP handlers.
///
/// Wraps a [`toolkit_core::Error`] together with the response status it is
/// rendered with (400 unless overridden) and an optional `data` payload for
/// the envelope, used to report partial results next to a failure.
#[must_use = "errors do nothing unless rendered"]
pub struct Error {
    inner: toolkit_core::Error,
    status: StatusCode,
    data: Option<Value>,
}

impl Error {
    /// Creates a new [`Error`] rendered with `400 Bad Request`.
    #[inline]
    pub fn new(inner: toolkit_core::Error) -> Self {
        Self {
            inner,
            status: StatusCode::BAD_REQUEST,
            data: None,
        }
    }

    /// Overrides the response status.
    #[inline]
    pub fn with_status(self, status: StatusCode) -> Self {
        Self { status, ..self }
    }

    /// Attaches a `data` payload to the error envelope.
    #[inline]
    pub fn with_data(self, data: Value) -> Self {
        Self {
            data: Some(data),
            ..self
        }
    }

    /// Returns the kind of the wrapped error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind()
    }

    /// Returns the response status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the envelope message.
    #[inline]
    pub fn message(&self) -> &str {
        self.inner.message()
    }

    /// Returns the wrapped error.
    #[inline]
    pub fn into_inner(self) -> toolkit_core::Error {
        self.inner
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.inner.kind())
            .field("status", &self.status)
            .field("message", &self.inner.message())
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.inner.kind().as_str(),
            self.status.as_u16(),
            self.inner.message()
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl From<toolkit_core::Error> for Error {
    #[inline]
    fn from(inner: toolkit_core::Error) -> Self {
        Self::new(inner)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: TRACING_TARGET_RESPONSE,
            kind = self.inner.kind().as_str(),
            status = self.status.as_u16(),
            message = self.inner.message(),
            "Rendering error response"
        );

        let envelope = JsonResponse {
            error: true,
            message: self.inner.message().to_owned(),
            data: self.data,
        };

        (self.status, envelope).into_response()
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;
