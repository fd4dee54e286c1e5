//! Port for club application persistence.
//!
//! Every transition is conditional on the stored status still being
//! `pending`, which gives each application a single linear history even when
//! two admins act on it at once.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ApplicationId, ClubApplication, ClubId, Resolution, ResolveOutcome, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError: store "application repository" {
        /// A pending application already exists for the user and club.
        DuplicatePending { club: String } =>
            "a pending application to club {club} already exists",
    }
}

/// Storage for club applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fetch an application by identifier.
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError>;

    /// The pending application of `user` to `club`, if any.
    async fn find_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<Option<ClubApplication>, ApplicationRepositoryError>;

    /// Insert a pending application.
    ///
    /// Fails with [`ApplicationRepositoryError::DuplicatePending`] when one
    /// already exists for the same user and club.
    async fn insert_pending(
        &self,
        application: &ClubApplication,
    ) -> Result<(), ApplicationRepositoryError>;

    /// Delete the pending application of `user` to `club`.
    ///
    /// Returns `false` when there was nothing pending.
    async fn delete_pending(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, ApplicationRepositoryError>;

    /// Move a pending application to its resolved status.
    ///
    /// Accepting inserts the membership in the same transaction.
    async fn resolve_pending(
        &self,
        id: &ApplicationId,
        resolution: Resolution,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolveOutcome, ApplicationRepositoryError>;

    /// Applications to a club, newest first.
    async fn list_for_club(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError>;

    /// Applications by a user, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ClubApplication>, ApplicationRepositoryError>;
}
