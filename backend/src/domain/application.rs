//! Club applications and their lifecycle.
//!
//! An application starts as [`ApplicationStatus::Pending`] and moves exactly
//! once to `Accepted` or `Rejected`. Both are terminal. Cancelling a pending
//! application deletes it instead of recording a further status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApplicationId, ClubId, UserId};

/// Application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Awaiting a decision from the club admin.
    Pending,
    /// Accepted; the applicant is a member.
    Accepted,
    /// Rejected.
    Rejected,
}

impl ApplicationStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn from_storage(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision taken on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Accept and create the membership.
    Accept,
    /// Reject.
    Reject,
}

impl Resolution {
    /// Status the application ends in.
    #[must_use]
    pub const fn status(self) -> ApplicationStatus {
        match self {
            Self::Accept => ApplicationStatus::Accepted,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }

    /// Past-tense verb used in notifications.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Accept => "accepted",
            Self::Reject => "rejected",
        }
    }
}

/// A student's request to join a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubApplication {
    /// Stable identifier.
    pub id: ApplicationId,
    /// Applicant.
    pub user: UserId,
    /// Target club.
    pub club: ClubId,
    /// Current state.
    pub status: ApplicationStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Decision time, set once the application is resolved.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ClubApplication {
    /// Build a fresh pending application.
    #[must_use]
    pub fn pending(user: UserId, club: ClubId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId::random(),
            user,
            club,
            status: ApplicationStatus::Pending,
            created_at,
            resolved_at: None,
        }
    }

    /// Whether the application still awaits a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

/// Result of a compare-and-set on a pending application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The application moved out of `Pending`.
    Resolved(ClubApplication),
    /// The application had already been resolved.
    AlreadyResolved,
    /// No application with that id exists.
    Missing,
}

/// Filter for listing a club's applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationFilter {
    /// Only pending applications.
    #[default]
    Pending,
    /// Every application.
    All,
}

impl ApplicationFilter {
    /// Whether `application` passes the filter.
    #[must_use]
    pub fn admits(self, application: &ClubApplication) -> bool {
        match self {
            Self::Pending => application.is_pending(),
            Self::All => true,
        }
    }
}

/// Message sent to the applicant once a decision is taken.
///
/// # Examples
/// ```
/// use campus_clubs::domain::{Resolution, resolution_message};
///
/// assert_eq!(
///     resolution_message("Chess Club", Resolution::Accept),
///     "Your application to Chess Club was accepted."
/// );
/// ```
#[must_use]
pub fn resolution_message(club_name: &str, resolution: Resolution) -> String {
    format!(
        "Your application to {club_name} was {}.",
        resolution.verb()
    )
}
