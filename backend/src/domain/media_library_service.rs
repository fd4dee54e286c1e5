//! Serving stored uploads.

use std::sync::Arc;

use async_trait::async_trait;

use super::repository_errors::map_media_error;
use crate::domain::ports::{MediaLibrary, MediaStorage, StoredImage};
use crate::domain::{Error, MediaName};

/// Service implementing [`MediaLibrary`].
#[derive(Clone)]
pub struct MediaLibraryService {
    media: Arc<dyn MediaStorage>,
}

impl MediaLibraryService {
    /// Create the service.
    pub fn new(media: Arc<dyn MediaStorage>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl MediaLibrary for MediaLibraryService {
    async fn open(&self, name: &str) -> Result<StoredImage, Error> {
        let not_found = || Error::not_found(format!("upload {name} not found"));
        let parsed = MediaName::parse(name).ok_or_else(not_found)?;
        let bytes = self
            .media
            .open(&parsed)
            .await
            .map_err(map_media_error)?
            .ok_or_else(not_found)?;
        Ok(StoredImage {
            kind: parsed.kind(),
            bytes,
        })
    }
}
