//! Driving port for serving uploaded images.

use async_trait::async_trait;

use crate::domain::{Error, ImageKind};

/// A stored image read back for serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Image format.
    pub kind: ImageKind,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// Read uploaded images by file name.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Load the image stored as `name` (`<uuid>.<ext>`).
    async fn open(&self, name: &str) -> Result<StoredImage, Error>;
}
