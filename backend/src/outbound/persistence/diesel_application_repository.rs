//! PostgreSQL-backed `ApplicationRepository` and `NotificationRepository`.
//!
//! Every transition out of `pending` is a conditional update keyed on
//! `status = 'pending'`. Accepting inserts the membership in the same
//! transaction, so a concurrent decision on the same application sees zero
//! updated rows and reports it as already resolved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, NotificationRepository,
    NotificationRepositoryError,
};
use crate::domain::{
    ApplicationId, ApplicationStatus, ClubApplication, ClubId, Notification, NotificationId,
    Resolution, ResolveOutcome, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_constraint,
};
use super::models::{ApplicationResolutionUpdate, ClubApplicationRow, ClubMemberRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{club_applications, club_members, notifications};

const ONE_PENDING_INDEX: &str = "club_applications_one_pending";

/// Diesel-backed implementation of the application repository port.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Outcome of the conditional update, before row validation.
enum CompareAndSet {
    Updated(ClubApplicationRow),
    Unchanged,
    Missing,
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_basic_pool_error(error, ApplicationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    map_basic_diesel_error(
        error,
        ApplicationRepositoryError::query,
        ApplicationRepositoryError::connection,
    )
}

fn row_to_application(row: ClubApplicationRow) -> Result<ClubApplication, ApplicationRepositoryError> {
    let status = ApplicationStatus::from_storage(&row.status).ok_or_else(|| {
        ApplicationRepositoryError::query(format!(
            "unknown status {} for application {}",
            row.status, row.id
        ))
    })?;
    Ok(ClubApplication {
        id: ApplicationId::from_uuid(row.id),
        user: UserId::from_uuid(row.user_id),
        club: ClubId::from_uuid(row.club_id),
        status,
        created_at: row.created_at,
        resolved_at: row.resolved_at,
    })
}

fn rows_to_applications(
    rows: Vec<ClubApplicationRow>,
) -> Result<Vec<ClubApplication>, ApplicationRepositoryError> {
    rows.into_iter().map(row_to_application).collect()
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = club_applications::table
            .find(*id.as_uuid())
            .select(ClubApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_application).transpose()
    }

    async fn find_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = club_applications::table
            .filter(club_applications::user_id.eq(*user.as_uuid()))
            .filter(club_applications::club_id.eq(*club.as_uuid()))
            .filter(club_applications::status.eq(ApplicationStatus::Pending.as_str()))
            .select(ClubApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_application).transpose()
    }

    async fn insert_pending(
        &self,
        application: &ClubApplication,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ClubApplicationRow {
            id: *application.id.as_uuid(),
            user_id: *application.user.as_uuid(),
            club_id: *application.club.as_uuid(),
            status: ApplicationStatus::Pending.as_str().to_owned(),
            created_at: application.created_at,
            resolved_at: None,
        };
        diesel::insert_into(club_applications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if violated_constraint(&error) == Some(ONE_PENDING_INDEX) {
                    ApplicationRepositoryError::duplicate_pending(application.club.to_string())
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn delete_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            club_applications::table
                .filter(club_applications::user_id.eq(*user.as_uuid()))
                .filter(club_applications::club_id.eq(*club.as_uuid()))
                .filter(club_applications::status.eq(ApplicationStatus::Pending.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn resolve_pending(
        &self,
        id: &ApplicationId,
        resolution: Resolution,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, ApplicationRepositoryError> {
        let application_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        club_applications::table
                            .filter(club_applications::id.eq(application_id))
                            .filter(
                                club_applications::status.eq(ApplicationStatus::Pending.as_str()),
                            ),
                    )
                    .set(&ApplicationResolutionUpdate {
                        status: resolution.status().as_str(),
                        resolved_at: Some(resolved_at),
                    })
                    .returning(ClubApplicationRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(row) = updated else {
                        let known = diesel::select(exists(
                            club_applications::table.find(application_id),
                        ))
                        .get_result::<bool>(conn)
                        .await?;
                        return Ok(if known {
                            CompareAndSet::Unchanged
                        } else {
                            CompareAndSet::Missing
                        });
                    };

                    if resolution == Resolution::Accept {
                        diesel::insert_into(club_members::table)
                            .values(&ClubMemberRow {
                                club_id: row.club_id,
                                user_id: row.user_id,
                                joined_at: resolved_at,
                            })
                            .on_conflict((club_members::club_id, club_members::user_id))
                            .do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    Ok(CompareAndSet::Updated(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            CompareAndSet::Updated(row) => row_to_application(row).map(ResolveOutcome::Resolved),
            CompareAndSet::Unchanged => Ok(ResolveOutcome::AlreadyResolved),
            CompareAndSet::Missing => Ok(ResolveOutcome::Missing),
        }
    }

    async fn list_for_club(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = club_applications::table
            .filter(club_applications::club_id.eq(*club.as_uuid()))
            .select(ClubApplicationRow::as_select())
            .order((
                club_applications::created_at.desc(),
                club_applications::id.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_applications(rows)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = club_applications::table
            .filter(club_applications::user_id.eq(*user.as_uuid()))
            .select(ClubApplicationRow::as_select())
            .order((
                club_applications::created_at.desc(),
                club_applications::id.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_applications(rows)
    }
}

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_notification_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_basic_pool_error(error, NotificationRepositoryError::connection)
}

fn map_notification_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Notification {
    Notification {
        id: NotificationId::from_uuid(row.id),
        user: UserId::from_uuid(row.user_id),
        message: row.message,
        application: row.application_id.map(ApplicationId::from_uuid),
        read: row.read,
        created_at: row.created_at,
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_notification_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&NotificationRow {
                id: *notification.id.as_uuid(),
                user_id: *notification.user.as_uuid(),
                message: notification.message.clone(),
                application_id: notification.application.map(|id| *id.as_uuid()),
                read: notification.read,
                created_at: notification.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_notification_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_notification_pool_error)?;
        let row = notifications::table
            .find(*id.as_uuid())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_notification_diesel_error)?;
        Ok(row.map(row_to_notification))
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_notification_pool_error)?;
        diesel::update(notifications::table.find(*id.as_uuid()))
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_notification_diesel_error)?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_notification_pool_error)?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(*user.as_uuid()))
            .select(NotificationRow::as_select())
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read.eq(false));
        }
        let rows = query
            .load(&mut conn)
            .await
            .map_err(map_notification_diesel_error)?;
        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    async fn count_unread(&self, user: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_notification_pool_error)?;
        let unread: i64 = notifications::table
            .filter(notifications::user_id.eq(*user.as_uuid()))
            .filter(notifications::read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_notification_diesel_error)?;
        Ok(u64::try_from(unread).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(status: &str) -> ClubApplicationRow {
        ClubApplicationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            status: status.to_owned(),
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[rstest]
    #[case("pending", ApplicationStatus::Pending)]
    #[case("accepted", ApplicationStatus::Accepted)]
    #[case("rejected", ApplicationStatus::Rejected)]
    fn stored_statuses_round_trip(#[case] raw: &str, #[case] expected: ApplicationStatus) {
        let application = row_to_application(row(raw)).expect("known status");

        assert_eq!(application.status, expected);
    }

    #[rstest]
    fn unknown_status_is_a_query_error() {
        let error = row_to_application(row("withdrawn")).expect_err("unknown status");

        assert!(matches!(error, ApplicationRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = map_pool_error(PoolError::build("invalid URL"));

        assert!(matches!(error, ApplicationRepositoryError::Connection { .. }));
    }
}
