//! Strongly typed identifiers for every aggregate.
//!
//! Each identifier wraps a UUID and serialises as its hyphenated string form.
//! Distinct types stop a club id from being passed where an application id is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Raised when a string is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidId {
    /// Name of the identifier type that failed to parse.
    pub kind: &'static str,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an identifier from its string form.
            pub fn parse(raw: &str) -> Result<Self, InvalidId> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| InvalidId { kind: $label })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a user account.
    UserId,
    "user id"
);
define_id!(
    /// Identifier of a university.
    UniversityId,
    "university id"
);
define_id!(
    /// Identifier of a club.
    ClubId,
    "club id"
);
define_id!(
    /// Identifier of a club application.
    ApplicationId,
    "application id"
);
define_id!(
    /// Identifier of a club post.
    PostId,
    "post id"
);
define_id!(
    /// Identifier of a post comment.
    CommentId,
    "comment id"
);
define_id!(
    /// Identifier of a notification.
    NotificationId,
    "notification id"
);
