//! Static file downloads.

use std::path::{Component, Path};

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::TRACING_TARGET_DOWNLOAD;

/// Serves the file at `path` as an attachment named `display_name`.
///
/// The file is served through [`ServeFile`], which answers range and
/// conditional requests and sets `Content-Type` and `Content-Length`.
/// A missing file yields `404 Not Found`.
pub async fn download_static_file(
    request: Request,
    path: impl AsRef<Path>,
    display_name: &str,
) -> Response {
    let path = path.as_ref();

    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = response.map(Body::new);
    let disposition = format!("attachment; filename=\"{display_name}\"");
    response.headers_mut().insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    tracing::info!(
        target: TRACING_TARGET_DOWNLOAD,
        path = %path.display(),
        display_name,
        status = response.status().as_u16(),
        "Served file download"
    );

    response
}

/// Serves `file_name` from `directory` as an attachment named `display_name`.
///
/// `file_name` must be a single plain path component; anything else,
/// including `..`, yields `404 Not Found`.
pub async fn download_static_file_in(
    request: Request,
    directory: impl AsRef<Path>,
    file_name: &str,
    display_name: &str,
) -> Response {
    let mut components = Path::new(file_name).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_component {
        tracing::warn!(
            target: TRACING_TARGET_DOWNLOAD,
            file_name,
            "Rejected download outside of the static directory"
        );
        return StatusCode::NOT_FOUND.into_response();
    }

    download_static_file(request, directory.as_ref().join(file_name), display_name).await
}
