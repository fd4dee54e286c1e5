//! Universities that clubs belong to.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UniversityId;

const NAME_MAX: usize = 120;

/// Validation errors raised by [`University::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniversityValidationError {
    /// Name was blank.
    EmptyName,
    /// Name exceeded the maximum length.
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Country code was not two ASCII letters.
    InvalidCountryCode,
}

impl fmt::Display for UniversityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "university name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "university name must be at most {max} characters")
            }
            Self::InvalidCountryCode => {
                write!(f, "country code must be a two-letter ISO 3166-1 code")
            }
        }
    }
}

impl std::error::Error for UniversityValidationError {}

/// A university and the country it is located in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct University {
    /// Stable identifier.
    pub id: UniversityId,
    /// Display name.
    pub name: String,
    /// Upper-case ISO 3166-1 alpha-2 code.
    #[schema(example = "GB")]
    pub country_code: String,
}

impl University {
    /// Validate the inputs and build a new university with a fresh id.
    ///
    /// # Examples
    /// ```
    /// use campus_clubs::domain::University;
    ///
    /// let uni = University::try_new("Example University", "gb").expect("valid");
    /// assert_eq!(uni.country_code, "GB");
    /// ```
    pub fn try_new(name: &str, country_code: &str) -> Result<Self, UniversityValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UniversityValidationError::EmptyName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(UniversityValidationError::NameTooLong { max: NAME_MAX });
        }
        let code = country_code.trim().to_ascii_uppercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(UniversityValidationError::InvalidCountryCode);
        }
        Ok(Self {
            id: UniversityId::random(),
            name: name.to_owned(),
            country_code: code,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "GB", UniversityValidationError::EmptyName)]
    #[case("Uni", "GBR", UniversityValidationError::InvalidCountryCode)]
    #[case("Uni", "1A", UniversityValidationError::InvalidCountryCode)]
    fn rejects_invalid_input(
        #[case] name: &str,
        #[case] code: &str,
        #[case] expected: UniversityValidationError,
    ) {
        assert_eq!(University::try_new(name, code), Err(expected));
    }
}
