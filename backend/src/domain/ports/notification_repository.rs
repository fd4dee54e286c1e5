//! Port for notification persistence.
use async_trait::async_trait;

use crate::domain::{Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError: store "notification repository" {}
}

/// Storage for notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Fetch a notification by identifier.
    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Set the read flag.
    async fn mark_read(&self, id: &NotificationId) -> Result<(), NotificationRepositoryError>;

    /// Notifications for `user`, most recent first, ties by id descending.
    async fn list_for_user(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications for `user`.
    async fn count_unread(&self, user: &UserId) -> Result<u64, NotificationRepositoryError>;
}
