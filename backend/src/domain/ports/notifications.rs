//! Driving port for in-app notifications.

use async_trait::async_trait;

use crate::domain::{
    ApplicationId, Error, Notification, NotificationFilter, NotificationId, RequestContext,
    UserId,
};

/// Create, list and acknowledge notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifications: Send + Sync {
    /// Store an unread notification for `user`.
    async fn emit(
        &self,
        user: &UserId,
        message: &str,
        application: Option<ApplicationId>,
    ) -> Result<Notification, Error>;

    /// Mark one of the requester's notifications as read.
    async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: &NotificationId,
    ) -> Result<Notification, Error>;

    /// The requester's notifications, most recent first.
    async fn list_for(
        &self,
        ctx: &RequestContext,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, Error>;

    /// Number of unread notifications for the requester.
    async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, Error>;
}
