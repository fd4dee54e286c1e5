//! Port for club persistence, including atomic provisioning and deletion.
use async_trait::async_trait;

use crate::domain::{Club, ClubId, UniversityId, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by club repository adapters.
    pub enum ClubRepositoryError: store "club repository" {
        /// The admin email is already registered.
        DuplicateAdminEmail { email: String } => "email {email} is already registered",
        /// The club references a university that does not exist.
        UnknownUniversity { university: String } => "university {university} does not exist",
    }
}

/// Member and follower totals for one club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClubCounts {
    /// Number of members.
    pub members: u64,
    /// Number of followers.
    pub followers: u64,
}

/// Storage for clubs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubRepository: Send + Sync {
    /// Fetch a club by identifier.
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError>;

    /// Clubs ordered by name, optionally restricted to one university.
    async fn list(
        &self,
        university: Option<UniversityId>,
    ) -> Result<Vec<Club>, ClubRepositoryError>;

    /// Club administered by `admin`, if any.
    async fn find_by_admin(&self, admin: &UserId) -> Result<Option<Club>, ClubRepositoryError>;

    /// Insert the admin account and the club in one transaction.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_with_admin(
        &self,
        club: &Club,
        admin: &UserAccount,
    ) -> Result<(), ClubRepositoryError>;

    /// Delete a club and everything its deletion cascades to.
    ///
    /// Returns `false` when the club did not exist.
    async fn delete_cascading(&self, id: &ClubId) -> Result<bool, ClubRepositoryError>;

    /// Member and follower totals.
    async fn counts(&self, id: &ClubId) -> Result<ClubCounts, ClubRepositoryError>;
}
