//! Port for follow and membership relations.
use async_trait::async_trait;

use crate::domain::{ClubId, ClubMember, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by membership repository adapters.
    pub enum MembershipRepositoryError: store "membership repository" {}
}

/// Storage for follows and memberships.
///
/// Mutations are idempotent: they report whether a row changed rather than
/// failing on duplicates or missing rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Record a follow. Returns `true` when the follow is new.
    async fn follow(&self, user: &UserId, club: &ClubId)
    -> Result<bool, MembershipRepositoryError>;

    /// Remove a follow. Returns `true` when a follow was removed.
    async fn unfollow(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Whether `user` follows `club`.
    async fn is_follower(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Whether `user` is a member of `club`.
    async fn is_member(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Remove a membership. Returns `true` when a membership was removed.
    async fn remove_member(
        &self,
        club: &ClubId,
        user: &UserId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Members of a club, oldest first.
    async fn list_members(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubMember>, MembershipRepositoryError>;

    /// Clubs `user` follows.
    async fn followed_clubs(&self, user: &UserId)
    -> Result<Vec<ClubId>, MembershipRepositoryError>;

    /// Clubs `user` belongs to.
    async fn joined_clubs(&self, user: &UserId) -> Result<Vec<ClubId>, MembershipRepositoryError>;
}
