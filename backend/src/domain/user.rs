//! User accounts, roles, and validated email addresses.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{UniversityId, UserId};

const EMAIL_MAX: usize = 254;

/// Validation errors returned by [`Email::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// The address was blank.
    Empty,
    /// The address exceeded [`EMAIL_MAX`] characters.
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The address does not look like `local@domain`.
    Malformed,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email must not be empty"),
            Self::TooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::Malformed => write!(f, "email must look like name@example.org"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised, lower-cased email address used as the login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada@uni.example")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use campus_clubs::domain::Email;
    ///
    /// let email = Email::parse("  Ada@Uni.Example ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@uni.example");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EmailValidationError> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(EmailValidationError::TooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(EmailValidationError::Malformed);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Role assigned at account creation. Roles never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Browses, follows, applies to and posts in clubs.
    Student,
    /// Moderates the single club they administer.
    ClubAdmin,
    /// Provisions clubs, either for one university or globally.
    UniversityAdmin,
}

impl Role {
    /// Storage representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::ClubAdmin => "club_admin",
            Self::UniversityAdmin => "university_admin",
        }
    }

    /// Parse the storage representation produced by [`Role::as_str`].
    #[must_use]
    pub fn from_storage(raw: &str) -> Option<Self> {
        match raw {
            "student" => Some(Self::Student),
            "club_admin" => Some(Self::ClubAdmin),
            "university_admin" => Some(Self::UniversityAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public view of a user account.
///
/// ## Invariants
/// - Students and club admins always belong to a university.
/// - A university admin without a university administers every university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Immutable role.
    pub role: Role,
    /// Home university, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<UniversityId>,
}

/// Opaque password digest produced by a credential hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// A user together with the stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// The public user record.
    pub user: User,
    /// Digest checked during login.
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", EmailValidationError::Empty)]
    #[case("   ", EmailValidationError::Empty)]
    #[case("no-at-sign", EmailValidationError::Malformed)]
    #[case("two@@example.org", EmailValidationError::Malformed)]
    #[case("missing@tld", EmailValidationError::Malformed)]
    fn rejects_invalid_email(#[case] raw: &str, #[case] expected: EmailValidationError) {
        assert_eq!(Email::parse(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_email() {
        let raw = format!("{}@example.org", "a".repeat(250));
        assert_eq!(
            Email::parse(&raw),
            Err(EmailValidationError::TooLong { max: EMAIL_MAX })
        );
    }

    #[rstest]
    #[case(Role::Student)]
    #[case(Role::ClubAdmin)]
    #[case(Role::UniversityAdmin)]
    fn role_storage_form_parses_back(#[case] role: Role) {
        assert_eq!(Role::from_storage(role.as_str()), Some(role));
    }

    #[rstest]
    fn role_serialises_in_screaming_case() {
        let value = serde_json::to_value(Role::ClubAdmin).expect("serialise role");
        assert_eq!(value, "CLUB_ADMIN");
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("secret-digest");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
