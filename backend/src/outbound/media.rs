//! Filesystem-backed `MediaStorage` rooted at one capability directory.
//!
//! Files are written under a staging name and renamed into place, so a reader
//! never observes a partially written upload. Lookups only ever use names
//! produced by [`MediaName`], which cannot contain path separators.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};

use crate::domain::ports::{MediaStorage, MediaStorageError};
use crate::domain::{ImageUpload, MediaName};

/// Stores uploads as `<uuid>.<ext>` inside a single directory.
#[derive(Clone)]
pub struct DirectoryMediaStorage {
    root: Arc<Dir>,
}

impl DirectoryMediaStorage {
    /// Open (creating if needed) the uploads directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStorageError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MediaStorageError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| io_error("create uploads directory", path.display(), &err))?;
        let root = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| io_error("open uploads directory", path.display(), &err))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

fn io_error(action: &str, target: impl std::fmt::Display, err: &io::Error) -> MediaStorageError {
    MediaStorageError::io(format!("{action} {target}: {err}"))
}

fn join_error(err: &tokio::task::JoinError) -> MediaStorageError {
    MediaStorageError::io(format!("media task failed: {err}"))
}

fn write_atomically(root: &Dir, name: &str, bytes: &[u8]) -> Result<(), MediaStorageError> {
    let staging = format!(".tmp-{name}");
    root.write(&staging, bytes)
        .map_err(|err| io_error("write", &staging, &err))?;
    if let Err(err) = root.rename(&staging, root, name) {
        if let Err(cleanup) = root.remove_file(&staging) {
            warn!(file = %staging, error = %cleanup, "failed to remove staged upload");
        }
        return Err(io_error("publish", name, &err));
    }
    Ok(())
}

#[async_trait]
impl MediaStorage for DirectoryMediaStorage {
    async fn store(&self, image: &ImageUpload) -> Result<MediaName, MediaStorageError> {
        let name = MediaName::generate(image.kind());
        let file_name = name.to_string();
        let bytes = image.bytes().to_vec();
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || write_atomically(&root, &file_name, &bytes))
            .await
            .map_err(|err| join_error(&err))??;
        debug!(file = %name, "upload stored");
        Ok(name)
    }

    async fn open(&self, name: &MediaName) -> Result<Option<Vec<u8>>, MediaStorageError> {
        let file_name = name.to_string();
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || match root.read(&file_name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("read", &file_name, &err)),
        })
        .await
        .map_err(|err| join_error(&err))?
    }

    async fn remove(&self, name: &MediaName) -> Result<bool, MediaStorageError> {
        let file_name = name.to_string();
        let root = Arc::clone(&self.root);
        let removed = tokio::task::spawn_blocking(move || match root.remove_file(&file_name) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error("remove", &file_name, &err)),
        })
        .await
        .map_err(|err| join_error(&err))??;
        debug!(file = %name, removed, "upload removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    //! Round trips through a temporary uploads directory.
    use super::*;
    use crate::domain::{DEFAULT_MAX_UPLOAD_BYTES, ImageKind, UPLOADS_PREFIX};
    use rstest::rstest;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[rstest]
    #[tokio::test]
    async fn stored_images_can_be_read_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = DirectoryMediaStorage::open(dir.path()).expect("storage");
        let upload =
            ImageUpload::try_new("image/png", PNG.to_vec(), DEFAULT_MAX_UPLOAD_BYTES).expect("png");

        let name = storage.store(&upload).await.expect("stored");
        let bytes = storage.open(&name).await.expect("read");

        assert_eq!(bytes.as_deref(), Some(PNG));
        assert_eq!(name.kind(), ImageKind::Png);
        assert!(name.url().as_ref().starts_with(UPLOADS_PREFIX));
        assert!(dir.path().join(name.to_string()).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_names_are_absent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = DirectoryMediaStorage::open(dir.path()).expect("storage");

        let bytes = storage
            .open(&MediaName::generate(ImageKind::Gif))
            .await
            .expect("read");

        assert!(bytes.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn removed_images_are_gone() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = DirectoryMediaStorage::open(dir.path()).expect("storage");
        let upload =
            ImageUpload::try_new("image/png", PNG.to_vec(), DEFAULT_MAX_UPLOAD_BYTES).expect("png");
        let name = storage.store(&upload).await.expect("stored");

        assert!(storage.remove(&name).await.expect("first removal"));
        assert!(!storage.remove(&name).await.expect("second removal"));
        assert!(storage.open(&name).await.expect("read").is_none());
    }

    #[rstest]
    fn missing_directories_are_created() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("media").join("uploads");

        DirectoryMediaStorage::open(&nested).expect("storage");

        assert!(nested.is_dir());
    }
}
