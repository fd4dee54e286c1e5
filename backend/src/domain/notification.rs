//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApplicationId, NotificationId, UserId};

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Stable identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user: UserId,
    /// Human-readable text.
    pub message: String,
    /// Application the notification is about, cleared if the application is
    /// deleted with its club.
    pub application: Option<ApplicationId>,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification.
    #[must_use]
    pub fn unread(
        user: UserId,
        message: impl Into<String>,
        application: Option<ApplicationId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::random(),
            user,
            message: message.into(),
            application,
            read: false,
            created_at,
        }
    }
}

/// Which notifications to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    /// Read and unread.
    #[default]
    All,
    /// Unread only.
    Unread,
}

impl NotificationFilter {
    /// Whether only unread notifications are requested.
    #[must_use]
    pub const fn unread_only(self) -> bool {
        matches!(self, Self::Unread)
    }
}

/// Sort most recent first, ties broken by id descending.
pub fn sort_most_recent_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    fn newest_comes_first() {
        let user = UserId::random();
        let now = Utc::now();
        let older = Notification::unread(user, "old", None, now - Duration::minutes(5));
        let newer = Notification::unread(user, "new", None, now);
        let mut items = vec![older.clone(), newer.clone()];

        sort_most_recent_first(&mut items);

        assert_eq!(items, vec![newer, older]);
    }

    #[rstest]
    fn ties_break_on_id() {
        let user = UserId::random();
        let now = Utc::now();
        let mut items = vec![
            Notification::unread(user, "a", None, now),
            Notification::unread(user, "b", None, now),
        ];

        sort_most_recent_first(&mut items);

        assert!(items[0].id.as_uuid() > items[1].id.as_uuid());
    }
}
