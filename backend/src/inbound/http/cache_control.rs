//! Shared cache-control policies for HTTP handlers.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Uploads are content-addressed by a random name and never change.
pub const IMMUTABLE_UPLOAD: &str = "public, max-age=31536000, immutable";

/// Header tuple for session-bound responses.
pub fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Header tuple for stored uploads.
pub fn immutable_upload_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, IMMUTABLE_UPLOAD)
}
