//! Clubs, follows and memberships.
//!
//! A club belongs to exactly one university and has exactly one admin
//! account. Follow and membership are independent relations: joining a club
//! does not follow it, and following grants no posting rights.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ClubId, Email, Password, UniversityId, UserId};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 2000;

/// Validation errors for club details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClubValidationError {
    /// Name shorter than the minimum.
    NameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Name longer than the maximum.
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description longer than the maximum.
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for ClubValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooShort { min } => write!(f, "club name must be at least {min} characters"),
            Self::NameTooLong { max } => write!(f, "club name must be at most {max} characters"),
            Self::DescriptionTooLong { max } => {
                write!(f, "club description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ClubValidationError {}

/// Validated club name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubDetails {
    name: String,
    description: String,
}

impl ClubDetails {
    /// Validate a name and description.
    pub fn try_new(name: &str, description: &str) -> Result<Self, ClubValidationError> {
        let name = name.trim();
        let length = name.chars().count();
        if length < NAME_MIN {
            return Err(ClubValidationError::NameTooShort { min: NAME_MIN });
        }
        if length > NAME_MAX {
            return Err(ClubValidationError::NameTooLong { max: NAME_MAX });
        }
        let description = description.trim();
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ClubValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
        })
    }

    /// Club name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Club description, possibly empty.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A club and its single administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Stable identifier.
    pub id: ClubId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Owning university.
    pub university: UniversityId,
    /// The club admin account.
    pub admin: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Club {
    /// Whether `user` is this club's admin.
    #[must_use]
    pub fn is_administered_by(&self, user: &UserId) -> bool {
        &self.admin == user
    }
}

/// Request to provision a club together with its admin account.
#[derive(Debug, Clone)]
pub struct NewClubRequest {
    /// Club name and description.
    pub details: ClubDetails,
    /// University the club belongs to.
    pub university: UniversityId,
    /// Email of the admin account to create.
    pub admin_email: Email,
    /// Initial password of the admin account.
    pub admin_password: Password,
}

/// A user's relationship with one club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubRelationship {
    /// The user follows the club.
    pub following: bool,
    /// The user is a member.
    pub member: bool,
    /// The user has a pending application.
    pub pending_application: bool,
    /// The user administers the club.
    pub admin: bool,
}

/// A member of a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubMember {
    /// The member.
    pub user: UserId,
    /// The club.
    pub club: ClubId,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
}

/// Clubs a user follows or has joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyClubs {
    /// Followed clubs.
    pub following: Vec<ClubId>,
    /// Joined clubs.
    pub member_of: Vec<ClubId>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ab", ClubValidationError::NameTooShort { min: NAME_MIN })]
    #[case("   ab   ", ClubValidationError::NameTooShort { min: NAME_MIN })]
    fn rejects_short_names(#[case] name: &str, #[case] expected: ClubValidationError) {
        assert_eq!(ClubDetails::try_new(name, ""), Err(expected));
    }

    #[rstest]
    fn rejects_long_descriptions() {
        let description = "x".repeat(DESCRIPTION_MAX + 1);
        assert_eq!(
            ClubDetails::try_new("Chess Club", &description),
            Err(ClubValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX
            })
        );
    }

    #[rstest]
    fn admin_check_compares_ids() {
        let admin = UserId::random();
        let club = Club {
            id: ClubId::random(),
            name: "Chess Club".into(),
            description: String::new(),
            university: UniversityId::random(),
            admin,
            created_at: Utc::now(),
        };
        assert!(club.is_administered_by(&admin));
        assert!(!club.is_administered_by(&UserId::random()));
    }
}
