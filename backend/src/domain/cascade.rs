//! Explicit cascade rules applied when a club is deleted.
//!
//! Storage adapters must honour every rule: the PostgreSQL schema declares the
//! matching `ON DELETE` clause per foreign key, and the in-memory store walks
//! the list itself.

/// What happens to a dependent row when its parent disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAction {
    /// Remove the dependent row.
    Delete,
    /// Keep the row and clear the reference.
    Detach,
    /// Remove the row the deleted club points at, in the same transaction.
    DeleteReferenced,
}

impl CascadeAction {
    /// SQL referential action implementing the rule.
    ///
    /// `None` for rules the adapter applies itself because they run against
    /// the direction of the foreign key.
    #[must_use]
    pub const fn sql(self) -> Option<&'static str> {
        match self {
            Self::Delete => Some("ON DELETE CASCADE"),
            Self::Detach => Some("ON DELETE SET NULL"),
            Self::DeleteReferenced => None,
        }
    }
}

/// One foreign-key relation and its deletion behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeRule {
    /// Table holding the reference.
    pub dependent: &'static str,
    /// Referencing column.
    pub column: &'static str,
    /// Referenced table.
    pub parent: &'static str,
    /// Name of the foreign-key constraint.
    pub constraint: &'static str,
    /// Behaviour on parent deletion.
    pub action: CascadeAction,
}

/// Every relation touched by club deletion.
///
/// The final rule runs against the foreign key: the club admin account is
/// removed together with the club, so no admin outlives the club it was
/// created for. Removing that account applies [`USER_DELETION_CASCADE`].
pub const CLUB_DELETION_CASCADE: &[CascadeRule] = &[
    CascadeRule {
        dependent: "posts",
        column: "club_id",
        parent: "clubs",
        constraint: "posts_club_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "post_comments",
        column: "post_id",
        parent: "posts",
        constraint: "post_comments_post_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "post_likes",
        column: "post_id",
        parent: "posts",
        constraint: "post_likes_post_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "club_applications",
        column: "club_id",
        parent: "clubs",
        constraint: "club_applications_club_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "notifications",
        column: "application_id",
        parent: "club_applications",
        constraint: "notifications_application_id_fkey",
        action: CascadeAction::Detach,
    },
    CascadeRule {
        dependent: "club_members",
        column: "club_id",
        parent: "clubs",
        constraint: "club_members_club_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "follows",
        column: "club_id",
        parent: "clubs",
        constraint: "follows_club_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "clubs",
        column: "admin_id",
        parent: "users",
        constraint: "clubs_admin_id_fkey",
        action: CascadeAction::DeleteReferenced,
    },
];

/// Rows owned by a user account, removed when the account is deleted.
pub const USER_DELETION_CASCADE: &[CascadeRule] = &[
    CascadeRule {
        dependent: "posts",
        column: "author_id",
        parent: "users",
        constraint: "posts_author_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "post_comments",
        column: "author_id",
        parent: "users",
        constraint: "post_comments_author_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "post_likes",
        column: "user_id",
        parent: "users",
        constraint: "post_likes_user_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "club_applications",
        column: "user_id",
        parent: "users",
        constraint: "club_applications_user_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "notifications",
        column: "user_id",
        parent: "users",
        constraint: "notifications_user_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "club_members",
        column: "user_id",
        parent: "users",
        constraint: "club_members_user_id_fkey",
        action: CascadeAction::Delete,
    },
    CascadeRule {
        dependent: "follows",
        column: "user_id",
        parent: "users",
        constraint: "follows_user_id_fkey",
        action: CascadeAction::Delete,
    },
];

/// Look up the rule for a dependent table and column.
#[must_use]
pub fn rule_for(dependent: &str, column: &str) -> Option<&'static CascadeRule> {
    CLUB_DELETION_CASCADE
        .iter()
        .chain(USER_DELETION_CASCADE)
        .find(|rule| rule.dependent == dependent && rule.column == column)
}
