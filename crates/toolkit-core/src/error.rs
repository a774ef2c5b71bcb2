//! Error types shared by every toolkit crate.
//!
//! [`ErrorKind`] is the closed taxonomy of failures the toolkit reports. No
//! HTTP status is attached to a kind: response status is chosen by whoever
//! renders the error.

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for toolkit operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in toolkit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The destination directory could not be created.
    DirectoryCreateFailed,
    /// The multipart body exceeded the configured byte cap.
    UploadTooLarge,
    /// The multipart body could not be parsed.
    MalformedUpload,
    /// The sniffed content type is not in the allow-list.
    UnsupportedFileType,
    /// A single-file upload contained no file part.
    NoFileProvided,
    /// Opening, creating, seeking or copying a stream failed.
    Io,
    /// The JSON body exceeded the configured byte cap.
    BodyTooLarge,
    /// The JSON body is syntactically invalid.
    MalformedJson,
    /// A JSON value does not match the destination type.
    TypeMismatch,
    /// An object key has no matching destination field.
    UnknownField,
    /// The body contained no JSON value.
    EmptyBody,
    /// The body contained more than one JSON value.
    TrailingContent,
    /// Slugify was given an empty string.
    EmptyInput,
    /// Slugify removed every character of its input.
    EmptyResult,
    /// A value could not be serialized.
    Serialization,
    /// An outbound HTTP call failed.
    Remote,
}

impl ErrorKind {
    /// Creates an [`Error`] of this kind with the given message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self, message)
    }

    /// Returns the error kind as a snake_case string.
    #[must_use]
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Toolkit error with a kind, a human-readable message and an optional source.
///
/// The message is written for end users and is what ends up in the
/// `message` field of error envelopes.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new I/O error wrapping `source`.
    pub fn io(message: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, message).with_source(source)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string()).with_source(err)
    }
}
