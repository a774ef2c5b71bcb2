//! Error types for toolkit-reqwest.

use thiserror::Error;
use toolkit_core::ErrorKind;

/// Result type alias for toolkit-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for outbound requests.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for toolkit_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) if e.is_timeout() => ErrorKind::Remote
                .with_message("remote request timed out")
                .with_source(e),
            Error::Reqwest(e) if e.is_connect() => ErrorKind::Remote
                .with_message("could not connect to remote")
                .with_source(e),
            Error::Reqwest(e) => ErrorKind::Remote.with_message(e.to_string()).with_source(e),
            Error::Serde(e) => ErrorKind::Serialization
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}
