//! Strict JSON decoding and JSON envelope writers.
//!
//! [`read_json`] reads a request body through a byte-counting limiter and
//! decodes exactly one JSON value from it, mapping every failure onto the
//! closed [`ErrorKind`] taxonomy with a message suitable for API clients.
//! [`write_json`], [`error_json`] and [`error_json_with_status`] produce
//! responses with `Content-Type: application/json`.

use std::fmt;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use toolkit_core::{Error, ErrorKind, Result};

use crate::TRACING_TARGET_JSON;
use crate::config::JsonConfig;
use crate::handler::response::JsonResponse;

/// Reads `body` and decodes exactly one JSON value of type `T` from it.
///
/// # Errors
///
/// - [`ErrorKind::BodyTooLarge`] when the body exceeds
///   [`JsonConfig::max_body_size`].
/// - [`ErrorKind::Io`] when the body stream fails.
/// - Any error produced by [`decode_json`].
pub async fn read_json<T>(body: Body, config: &JsonConfig) -> Result<T>
where
    T: DeserializeOwned,
{
    let limit = config.max_body_size;
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => {
            tracing::warn!(
                target: TRACING_TARGET_JSON,
                limit,
                "Rejected oversized JSON body"
            );
            return Err(ErrorKind::BodyTooLarge
                .with_message(format!("body must not be larger than {limit} bytes")));
        }
        Err(err) => {
            return Err(ErrorKind::Io.with_message(format!("failed to read body: {err}")));
        }
    };

    decode_json(&bytes, config)
}

/// Decodes exactly one JSON value of type `T` from `bytes`.
///
/// Unless [`JsonConfig::allow_unknown_fields`] is set, any object key that
/// the destination type would silently ignore is rejected.
///
/// # Errors
///
/// - [`ErrorKind::EmptyBody`] for an empty or whitespace-only body.
/// - [`ErrorKind::MalformedJson`] for syntax errors and premature ends.
/// - [`ErrorKind::TypeMismatch`] when a value does not fit the destination.
/// - [`ErrorKind::UnknownField`] for keys the destination does not declare.
/// - [`ErrorKind::TrailingContent`] when anything but whitespace follows
///   the first value.
pub fn decode_json<T>(bytes: &[u8], config: &JsonConfig) -> Result<T>
where
    T: DeserializeOwned,
{
    if bytes.iter().all(|b| is_json_whitespace(*b)) {
        return Err(ErrorKind::EmptyBody.with_message("body must not be empty"));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut track = serde_path_to_error::Track::new();
    let mut unknown_fields = Vec::new();

    let decoded: std::result::Result<T, serde_json::Error> = serde_ignored::deserialize(
        serde_path_to_error::Deserializer::new(&mut deserializer, &mut track),
        |path| unknown_fields.push(path.to_string()),
    );

    let strict = !config.allow_unknown_fields;
    let value = match decoded {
        Ok(value) => value,
        Err(err) => {
            let error = match unknown_fields.first() {
                Some(field) if strict && err.classify() == Category::Data => {
                    unknown_field(field).with_source(err)
                }
                _ => classify(err, &track.path().to_string(), bytes),
            };

            tracing::debug!(
                target: TRACING_TARGET_JSON,
                kind = error.kind().as_str(),
                message = error.message(),
                "Failed to decode JSON body"
            );
            return Err(error);
        }
    };

    if let Some(field) = unknown_fields.first().filter(|_| strict) {
        tracing::debug!(
            target: TRACING_TARGET_JSON,
            field = %field,
            "Rejected JSON body with unknown key"
        );
        return Err(unknown_field(field));
    }

    if let Err(err) = deserializer.end() {
        return Err(Error::new(
            ErrorKind::TrailingContent,
            "body must contain only one JSON value",
        )
        .with_source(err));
    }

    Ok(value)
}

/// Serializes `data` into a response with the given status.
///
/// `headers` are merged into the response before `Content-Type` is set to
/// `application/json`.
///
/// # Errors
///
/// Returns [`ErrorKind::Serialization`] if `data` cannot be serialized.
pub fn write_json<T>(status: StatusCode, data: &T, headers: Option<HeaderMap>) -> Result<Response>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(data).map_err(|err| {
        Error::new(
            ErrorKind::Serialization,
            format!("failed to serialize response: {err}"),
        )
        .with_source(err)
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;

    let response_headers = response.headers_mut();
    if let Some(headers) = headers {
        response_headers.extend(headers);
    }
    response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(response)
}

/// Writes `{"error": true, "message": <err>}` with `400 Bad Request`.
pub fn error_json(err: &impl fmt::Display) -> Response {
    error_json_with_status(err, StatusCode::BAD_REQUEST)
}

/// Writes `{"error": true, "message": <err>}` with the given status.
pub fn error_json_with_status(err: &impl fmt::Display, status: StatusCode) -> Response {
    let envelope = JsonResponse::<()>::failure(err.to_string());
    (status, envelope).into_response()
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn unknown_field(field: &str) -> Error {
    ErrorKind::UnknownField.with_message(format!("body contains unknown key \"{field}\""))
}

fn classify(err: serde_json::Error, path: &str, bytes: &[u8]) -> Error {
    let error = match err.classify() {
        Category::Eof => ErrorKind::MalformedJson.with_message("body contains badly-formed JSON"),
        Category::Syntax => ErrorKind::MalformedJson.with_message(format!(
            "body contains badly-formed JSON (at character {})",
            byte_offset(bytes, err.line(), err.column())
        )),
        Category::Data => {
            let message = err.to_string();
            if let Some(field) = quoted_field(&message, "unknown field `") {
                unknown_field(field)
            } else if let Some(field) = quoted_field(&message, "missing field `") {
                ErrorKind::TypeMismatch.with_message(format!(
                    "body is missing required field \"{}\"",
                    qualify(path, field)
                ))
            } else if let Some(field) = quoted_field(&message, "duplicate field `") {
                ErrorKind::TypeMismatch.with_message(format!(
                    "body contains duplicate key \"{}\"",
                    qualify(path, field)
                ))
            } else if path != "." {
                ErrorKind::TypeMismatch.with_message(format!(
                    "body contains incorrect JSON type for field \"{path}\""
                ))
            } else {
                ErrorKind::TypeMismatch.with_message(format!(
                    "body contains incorrect JSON type (at character {})",
                    byte_offset(bytes, err.line(), err.column())
                ))
            }
        }
        Category::Io => ErrorKind::Io.with_message(format!("failed to read body: {err}")),
    };

    error.with_source(err)
}

/// Extracts the key from serde messages such as "unknown field `key`, expected ...".
fn quoted_field<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    message
        .strip_prefix(prefix)
        .and_then(|rest| rest.split('`').next())
}

/// Prefixes `field` with the path of its enclosing object; the root path is ".".
fn qualify(path: &str, field: &str) -> String {
    if path == "." {
        field.to_owned()
    } else {
        format!("{path}.{field}")
    }
}

/// Converts a 1-based line/column position into a byte count from the start.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = bytes
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|line| line.len() + 1)
        .sum();

    preceding + column
}
