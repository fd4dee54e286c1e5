//! Port for storing uploaded images.
use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media storage adapters.
    pub enum MediaStorageError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "media storage failed: {message}",
    }
}

/// Byte store for uploaded images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store an image under a fresh name and return that name.
    async fn store(&self, image: &ImageUpload) -> Result<MediaName, MediaStorageError>;

    /// Read a stored image back. `None` when nothing is stored under `name`.
    async fn open(&self, name: &MediaName) -> Result<Option<Vec<u8>>, MediaStorageError>;

    /// Delete a stored image. Returns `false` when nothing was stored.
    async fn remove(&self, name: &MediaName) -> Result<bool, MediaStorageError>;
}
