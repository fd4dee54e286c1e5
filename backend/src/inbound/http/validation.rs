//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns a domain `validation` error whose details name the
//! offending field, except oversized images which keep their dedicated
//! `payload_too_large` code.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{
    ClubValidationError, CredentialsValidationError, Error, ImageUpload, ImageUploadError,
    InvalidId, UniversityValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    InvalidBase64,
    InvalidImage,
    InvalidValue,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidBase64 => "invalid_base64",
            Self::InvalidImage => "invalid_image",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::validation(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::validation(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

/// Parse a path or body identifier, naming the field on failure.
pub(crate) fn parse_id<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: std::str::FromStr<Err = InvalidId>,
{
    raw.parse::<T>().map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidId, raw)
    })
}

/// Attach a field name to a domain validation failure.
pub(crate) fn invalid_field(field: FieldName, err: impl std::fmt::Display) -> Error {
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn map_credentials_error(err: &CredentialsValidationError) -> Error {
    let field = match err {
        CredentialsValidationError::Email(_) => FieldName::new("email"),
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => FieldName::new("password"),
    };
    invalid_field(field, err)
}

pub(crate) fn map_club_error(err: &ClubValidationError) -> Error {
    let field = match err {
        ClubValidationError::NameTooShort { .. } | ClubValidationError::NameTooLong { .. } => {
            FieldName::new("name")
        }
        ClubValidationError::DescriptionTooLong { .. } => FieldName::new("description"),
    };
    invalid_field(field, err)
}

pub(crate) fn map_university_error(err: &UniversityValidationError) -> Error {
    let field = match err {
        UniversityValidationError::InvalidCountryCode => FieldName::new("countryCode"),
        UniversityValidationError::EmptyName | UniversityValidationError::NameTooLong { .. } => {
            FieldName::new("name")
        }
    };
    invalid_field(field, err)
}

/// Base64-encoded image embedded in a JSON body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Declared MIME type, e.g. `image/png`.
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Standard base64 of the image bytes.
    pub data: String,
}

/// Decode and validate an embedded image.
///
/// Oversized images fail with `payload_too_large`; every other problem is a
/// `validation` error on the `image` field.
pub(crate) fn decode_image(payload: &ImagePayload, max_bytes: u64) -> Result<ImageUpload, Error> {
    let field = FieldName::new("image");
    let bytes = STANDARD.decode(payload.data.trim()).map_err(|_| {
        ValidationError::new(field, "image data must be standard base64")
            .with_code(ErrorCode::InvalidBase64)
    })?;
    ImageUpload::try_new(&payload.content_type, bytes, max_bytes).map_err(|err| match err {
        ImageUploadError::TooLarge { limit } => Error::payload_too_large(limit),
        other @ (ImageUploadError::Empty
        | ImageUploadError::UnsupportedType
        | ImageUploadError::SignatureMismatch) => {
            ValidationError::new(field, other.to_string()).with_code(ErrorCode::InvalidImage)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClubId, ErrorCode as DomainCode, ImageKind};
    use rstest::rstest;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n0000";

    fn payload(content_type: &str, bytes: &[u8]) -> ImagePayload {
        ImagePayload {
            content_type: content_type.to_owned(),
            data: STANDARD.encode(bytes),
        }
    }

    #[rstest]
    fn parse_id_names_the_field() {
        let err = parse_id::<ClubId>("nope", FieldName::new("clubId")).expect_err("invalid id");

        assert_eq!(err.code(), DomainCode::Validation);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "clubId");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_id");
    }

    #[rstest]
    fn parse_id_accepts_uuids() {
        let id = ClubId::random();

        let parsed: ClubId = parse_id(&id.to_string(), FieldName::new("clubId")).expect("valid");

        assert_eq!(parsed, id);
    }

    #[rstest]
    fn decodes_valid_images() {
        let upload = decode_image(&payload("image/png", PNG), 1024).expect("valid image");

        assert_eq!(upload.kind(), ImageKind::Png);
        assert_eq!(upload.bytes(), PNG);
    }

    #[rstest]
    fn oversized_images_are_payload_too_large() {
        let err = decode_image(&payload("image/png", PNG), 4).expect_err("too large");

        assert_eq!(err.code(), DomainCode::PayloadTooLarge);
    }

    #[rstest]
    #[case(payload("image/png", b""))]
    #[case(payload("text/plain", PNG))]
    #[case(payload("image/jpeg", PNG))]
    #[case(ImagePayload { content_type: "image/png".to_owned(), data: "***".to_owned() })]
    fn malformed_images_are_validation_errors(#[case] image: ImagePayload) {
        let err = decode_image(&image, 1024).expect_err("rejected");

        assert_eq!(err.code(), DomainCode::Validation);
        assert_eq!(err.details().expect("details")["field"], "image");
    }

    #[rstest]
    fn credential_errors_name_their_field() {
        let err = map_credentials_error(&CredentialsValidationError::PasswordTooShort { min: 8 });

        assert_eq!(err.details().expect("details")["field"], "password");
    }
}
