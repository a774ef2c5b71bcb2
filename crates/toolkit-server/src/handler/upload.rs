//! Multipart file ingestion.
//!
//! The whole `multipart/form-data` body is parsed first, with every file
//! part spooled to an anonymous temporary file inside the destination
//! directory. Only after the body was read completely are the parts
//! sniffed, checked against the allow-list and persisted, one by one, in
//! the order they appeared in the body.

use std::io::SeekFrom;
use std::path::Path;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use multer::{Constraints, Multipart, SizeLimit};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use toolkit_core::sniff::SNIFF_LEN;
use toolkit_core::{Error, ErrorKind, Result};

use crate::TRACING_TARGET_UPLOAD;
use crate::config::UploadConfig;

/// Length of the random token used by [`FileNaming::Random`].
pub const RANDOM_NAME_LEN: usize = 25;

/// How persisted files are named.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// A random 25-character token followed by the original extension.
    #[default]
    Random,
    /// The file name supplied by the client.
    Original,
}

/// A file persisted by the upload ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Name of the file inside the destination directory.
    pub new_file_name: String,
    /// Name the client supplied for the part.
    pub original_file_name: String,
    /// Number of bytes written.
    pub file_size: u64,
}

/// Failure of [`upload_files`] together with the files written before it.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PartialUpload {
    /// Files persisted before the failure, in encounter order.
    pub uploaded: Vec<UploadedFile>,
    /// The failure that stopped the ingestion.
    #[source]
    pub error: Error,
}

impl PartialUpload {
    fn empty(error: Error) -> Self {
        Self {
            uploaded: Vec::new(),
            error,
        }
    }

    /// Returns the kind of the underlying failure.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl From<PartialUpload> for crate::handler::Error {
    fn from(partial: PartialUpload) -> Self {
        let status = match partial.error.kind() {
            ErrorKind::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };

        let data = (!partial.uploaded.is_empty())
            .then(|| serde_json::to_value(&partial.uploaded).ok())
            .flatten();

        let error = Self::new(partial.error).with_status(status);
        match data {
            Some(data) => error.with_data(data),
            None => error,
        }
    }
}

/// A file part read from the body and held in a temporary file.
struct SpooledPart {
    file_name: String,
    file: File,
}

/// Ingests every file part of a `multipart/form-data` request into
/// `directory`.
///
/// # Errors
///
/// Returns a [`PartialUpload`] carrying the files already written and one of:
///
/// - [`ErrorKind::DirectoryCreateFailed`] if `directory` cannot be created.
/// - [`ErrorKind::UploadTooLarge`] if the body exceeds
///   [`UploadConfig::max_upload_size`].
/// - [`ErrorKind::MalformedUpload`] if the body is not valid multipart data.
/// - [`ErrorKind::UnsupportedFileType`] if a part's sniffed type is not
///   allowed. Earlier parts stay on disk.
/// - [`ErrorKind::Io`] if spooling, creating or copying a file fails.
pub async fn upload_files(
    request: Request,
    directory: impl AsRef<Path>,
    config: &UploadConfig,
    naming: FileNaming,
) -> Result<Vec<UploadedFile>, PartialUpload> {
    let directory = directory.as_ref();

    toolkit_core::create_dir_if_not_exist(directory)
        .await
        .map_err(PartialUpload::empty)?;

    let parts = spool_parts(request, directory, config)
        .await
        .map_err(PartialUpload::empty)?;

    let mut uploaded = Vec::with_capacity(parts.len());
    for part in parts {
        match persist_part(part, directory, config, naming).await {
            Ok(file) => uploaded.push(file),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    kind = error.kind().as_str(),
                    written = uploaded.len(),
                    error = %error,
                    "Upload aborted"
                );
                return Err(PartialUpload { uploaded, error });
            }
        }
    }

    tracing::info!(
        target: TRACING_TARGET_UPLOAD,
        directory = %directory.display(),
        count = uploaded.len(),
        "Upload completed"
    );

    Ok(uploaded)
}

/// Ingests a single file part; any further parts are processed the same
/// way as by [`upload_files`] but only the first record is returned.
///
/// # Errors
///
/// The errors of [`upload_files`], plus [`ErrorKind::NoFileProvided`] when
/// the body holds no file part.
pub async fn upload_one_file(
    request: Request,
    directory: impl AsRef<Path>,
    config: &UploadConfig,
    naming: FileNaming,
) -> Result<UploadedFile> {
    let uploaded = upload_files(request, directory, config, naming)
        .await
        .map_err(|partial| partial.error)?;

    uploaded
        .into_iter()
        .next()
        .ok_or_else(|| ErrorKind::NoFileProvided.with_message("no file provided"))
}

async fn spool_parts(
    request: Request,
    directory: &Path,
    config: &UploadConfig,
) -> Result<Vec<SpooledPart>> {
    let boundary = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| multer::parse_boundary(value).ok())
        .ok_or_else(|| {
            ErrorKind::MalformedUpload.with_message("request is not multipart/form-data")
        })?;

    let constraints = Constraints::new()
        .size_limit(SizeLimit::new().whole_stream(config.max_upload_size));
    let stream = request.into_body().into_data_stream();
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut parts = Vec::new();
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().and_then(base_name) else {
            continue;
        };

        let file = tempfile::tempfile_in(directory)
            .map_err(|err| Error::io("could not create temporary file", err))?;
        let mut file = File::from_std(file);

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|err| Error::io("could not spool file part", err))?;
        }
        file.flush()
            .await
            .map_err(|err| Error::io("could not spool file part", err))?;

        tracing::debug!(
            target: TRACING_TARGET_UPLOAD,
            file_name = %file_name,
            size,
            "Spooled file part"
        );

        parts.push(SpooledPart { file_name, file });
    }

    Ok(parts)
}

async fn persist_part(
    part: SpooledPart,
    directory: &Path,
    config: &UploadConfig,
    naming: FileNaming,
) -> Result<UploadedFile> {
    let SpooledPart { file_name, mut file } = part;

    file.seek(SeekFrom::Start(0)).await?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await?;

    let content_type = toolkit_core::detect_content_type(&head);
    if !config.is_allowed(content_type) {
        return Err(ErrorKind::UnsupportedFileType.with_message(format!(
            "the uploaded file type is not permitted: {content_type}"
        )));
    }

    file.seek(SeekFrom::Start(0)).await?;

    let new_file_name = match naming {
        FileNaming::Random => format!(
            "{}{}",
            toolkit_core::random_string(RANDOM_NAME_LEN),
            extension(&file_name)
        ),
        FileNaming::Original => file_name.clone(),
    };

    let path = directory.join(&new_file_name);
    let mut destination = File::create(&path)
        .await
        .map_err(|err| Error::io(format!("could not create {}", path.display()), err))?;

    let file_size = tokio::io::copy(&mut file, &mut destination)
        .await
        .map_err(|err| Error::io(format!("could not write {}", path.display()), err))?;
    destination
        .flush()
        .await
        .map_err(|err| Error::io(format!("could not write {}", path.display()), err))?;

    tracing::debug!(
        target: TRACING_TARGET_UPLOAD,
        original_file_name = %file_name,
        new_file_name = %new_file_name,
        content_type,
        file_size,
        "Persisted file part"
    );

    Ok(UploadedFile {
        new_file_name,
        original_file_name: file_name,
        file_size,
    })
}

fn multipart_error(err: multer::Error) -> Error {
    let error = match &err {
        multer::Error::StreamSizeExceeded { limit } => ErrorKind::UploadTooLarge
            .with_message(format!("upload must not be larger than {limit} bytes")),
        multer::Error::StreamReadFailed(_) => {
            ErrorKind::Io.with_message(format!("failed to read upload: {err}"))
        }
        _ => ErrorKind::MalformedUpload.with_message(format!("malformed multipart body: {err}")),
    };

    error.with_source(err)
}

/// Final path component of a client-supplied name, `None` when nothing is left.
fn base_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Suffix of a base name from its last `.`, or an empty string.
///
/// Dotfiles keep their whole name: `.bashrc` yields `.bashrc`.
fn extension(name: &str) -> &str {
    name.rfind('.').map_or("", |dot| &name[dot..])
}
