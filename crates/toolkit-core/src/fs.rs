//! Filesystem helpers.

use std::io;
use std::path::Path;

use tokio::fs::DirBuilder;

use crate::{Error, ErrorKind, Result, TRACING_TARGET_FS};

/// Permission bits for newly created directories on Unix.
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Creates `path` and all missing parents when it does not exist yet.
///
/// Idempotent: an existing directory, including one created concurrently by
/// another caller, is treated as success.
///
/// # Errors
///
/// Returns [`ErrorKind::DirectoryCreateFailed`] if the directory cannot be
/// created.
pub async fn create_dir_if_not_exist(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    match builder.create(path).await {
        Ok(()) => {
            tracing::debug!(
                target: TRACING_TARGET_FS,
                path = %path.display(),
                "Created directory"
            );
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && is_dir(path).await => Ok(()),
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_FS,
                path = %path.display(),
                error = %err,
                "Failed to create directory"
            );
            Err(Error::new(
                ErrorKind::DirectoryCreateFailed,
                format!("could not create directory {}", path.display()),
            )
            .with_source(err))
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_twice_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("testdir");

        create_dir_if_not_exist(&dir).await.unwrap();
        create_dir_if_not_exist(&dir).await.unwrap();

        assert!(dir.is_dir());
        let entries = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn creates_missing_parents() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("a").join("b").join("c");

        create_dir_if_not_exist(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn fails_when_a_file_is_in_the_way() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let err = create_dir_if_not_exist(file.join("child")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryCreateFailed);
    }

    #[tokio::test]
    async fn existing_file_is_not_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        assert!(is_dir(temp.path()).await);
        assert!(!is_dir(&file).await);
        assert!(!is_dir(&temp.path().join("missing")).await);
    }
}
