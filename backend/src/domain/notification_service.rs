//! Notification store service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::map_notification_error;
use crate::domain::ports::{NotificationRepository, Notifications};
use crate::domain::{
    Action, ApplicationId, Error, Notification, NotificationFilter, NotificationId,
    RequestContext, UserId,
};

/// Service implementing [`Notifications`].
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Create the service.
    pub fn new(notifications: Arc<dyn NotificationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }
}

#[async_trait]
impl Notifications for NotificationService {
    async fn emit(
        &self,
        user: &UserId,
        message: &str,
        application: Option<ApplicationId>,
    ) -> Result<Notification, Error> {
        let notification = Notification::unread(*user, message, application, self.clock.utc());
        self.notifications
            .insert(&notification)
            .await
            .map_err(map_notification_error)?;
        info!(user_id = %user, notification_id = %notification.id, "notification emitted");
        Ok(notification)
    }

    async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: &NotificationId,
    ) -> Result<Notification, Error> {
        let principal = ctx.acting(Action::StudentArea)?;
        let mut notification = self
            .notifications
            .find_by_id(id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| Error::not_found(format!("notification {id} not found")))?;
        if notification.user != principal.user_id() {
            return Err(Error::not_owner("this notification belongs to someone else"));
        }
        if !notification.read {
            self.notifications
                .mark_read(id)
                .await
                .map_err(map_notification_error)?;
            notification.read = true;
        }
        Ok(notification)
    }

    async fn list_for(
        &self,
        ctx: &RequestContext,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, Error> {
        let principal = ctx.acting(Action::StudentArea)?;
        self.notifications
            .list_for_user(&principal.user_id(), filter.unread_only())
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, Error> {
        let principal = ctx.acting(Action::StudentArea)?;
        self.notifications
            .count_unread(&principal.user_id())
            .await
            .map_err(map_notification_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockNotificationRepository, NotificationRepositoryError};
    use crate::domain::{ErrorCode, Principal, UniversityId};
    use chrono::Utc;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn student(id: UserId) -> RequestContext {
        RequestContext::authenticated(Principal::Student {
            id,
            university: UniversityId::random(),
        })
    }

    fn service(repo: MockNotificationRepository) -> NotificationService {
        NotificationService::new(Arc::new(repo), Arc::new(DefaultClock))
    }

    #[rstest]
    #[tokio::test]
    async fn mark_read_rejects_other_users() {
        let owner = UserId::random();
        let stored = Notification::unread(owner, "hello", None, Utc::now());
        let id = stored.id;
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        repo.expect_mark_read().times(0);

        let error = service(repo)
            .mark_read(&student(UserId::random()), &id)
            .await
            .expect_err("not the owner");

        assert_eq!(error.code(), ErrorCode::NotOwner);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_read_twice_is_a_no_op() {
        let owner = UserId::random();
        let mut stored = Notification::unread(owner, "hello", None, Utc::now());
        stored.read = true;
        let id = stored.id;
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        repo.expect_mark_read().times(0);

        let notification = service(repo)
            .mark_read(&student(owner), &id)
            .await
            .expect("already read");

        assert!(notification.read);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_notification_is_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(repo)
            .mark_read(&student(UserId::random()), &NotificationId::random())
            .await
            .expect_err("missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn emit_maps_connection_failures() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_insert()
            .return_once(|_| Err(NotificationRepositoryError::connection("refused")));

        let error = service(repo)
            .emit(&UserId::random(), "hi", None)
            .await
            .expect_err("store down");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_listing_is_unauthenticated() {
        let error = service(MockNotificationRepository::new())
            .list_for(&RequestContext::anonymous(), NotificationFilter::All)
            .await
            .expect_err("needs identity");

        assert_eq!(error.code(), ErrorCode::Unauthenticated);
    }
}
