//! Uploaded post images.
//!
//! Images are accepted as one of a small set of formats. The declared content
//! type must agree with the file signature, and stored files are always named
//! `<uuid>.<ext>` under `/uploads/`.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// URL prefix stored media is served from.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Default upload size limit (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// GIF.
    Gif,
    /// WebP.
    Webp,
}

impl ImageKind {
    /// Map a MIME type to a supported kind.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Map a stored file extension back to its kind.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used for stored files.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// MIME type served back to clients.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Whether `bytes` start with this format's signature.
    #[must_use]
    pub fn matches_signature(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => {
                bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice())
            }
        }
    }
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUploadError {
    /// No bytes were supplied.
    Empty,
    /// The upload exceeds the configured limit.
    TooLarge {
        /// Configured limit in bytes.
        limit: u64,
    },
    /// Content type is not a supported image format.
    UnsupportedType,
    /// Bytes do not match the declared content type.
    SignatureMismatch,
}

impl fmt::Display for ImageUploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "image must not be empty"),
            Self::TooLarge { limit } => write!(f, "image must be at most {limit} bytes"),
            Self::UnsupportedType => write!(f, "image must be PNG, JPEG, GIF or WebP"),
            Self::SignatureMismatch => write!(f, "image content does not match its type"),
        }
    }
}

impl std::error::Error for ImageUploadError {}

/// A validated image ready to be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    kind: ImageKind,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an upload against the size limit and its declared type.
    ///
    /// # Examples
    /// ```
    /// use campus_clubs::domain::{ImageKind, ImageUpload};
    ///
    /// let png = b"\x89PNG\r\n\x1a\nrest".to_vec();
    /// let upload = ImageUpload::try_new("image/png", png, 1024).expect("valid png");
    /// assert_eq!(upload.kind(), ImageKind::Png);
    /// ```
    pub fn try_new(
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: u64,
    ) -> Result<Self, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() as u64 > max_bytes {
            return Err(ImageUploadError::TooLarge { limit: max_bytes });
        }
        let kind =
            ImageKind::from_content_type(content_type).ok_or(ImageUploadError::UnsupportedType)?;
        if !kind.matches_signature(&bytes) {
            return Err(ImageUploadError::SignatureMismatch);
        }
        Ok(Self { kind, bytes })
    }

    /// Detected format.
    #[must_use]
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Name of a stored media file: `<uuid>.<ext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaName {
    id: Uuid,
    kind: ImageKind,
}

impl MediaName {
    /// Generate a fresh name for `kind`.
    #[must_use]
    pub fn generate(kind: ImageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }

    /// Parse a requested file name, rejecting anything not shaped like a
    /// generated name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (stem, extension) = raw.split_once('.')?;
        let id = Uuid::parse_str(stem).ok()?;
        // Only canonical hyphenated lower-case names are ever generated.
        if stem != id.hyphenated().to_string() {
            return None;
        }
        let kind = ImageKind::from_extension(extension)?;
        Some(Self { id, kind })
    }

    /// Image format.
    #[must_use]
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Public URL of the file.
    #[must_use]
    pub fn url(&self) -> MediaUrl {
        MediaUrl(format!("{UPLOADS_PREFIX}{self}"))
    }
}

impl fmt::Display for MediaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id.hyphenated(), self.kind.extension())
    }
}

/// Public URL of a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MediaUrl(String);

impl MediaUrl {
    /// Rehydrate a stored URL.
    #[must_use]
    pub fn from_storage(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// File name component, if the URL has the expected shape.
    #[must_use]
    pub fn media_name(&self) -> Option<MediaName> {
        self.0.strip_prefix(UPLOADS_PREFIX).and_then(MediaName::parse)
    }
}

impl AsRef<str> for MediaUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
