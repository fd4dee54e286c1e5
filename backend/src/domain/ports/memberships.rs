//! Driving port for follows and memberships.

use async_trait::async_trait;

use crate::domain::{
    ClubId, ClubMember, ClubRelationship, Error, MyClubs, RequestContext, UserId,
};

/// Follow clubs and manage club members.
#[async_trait]
pub trait Memberships: Send + Sync {
    /// Follow a club. Following twice is a no-op.
    async fn follow(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error>;

    /// Stop following a club. Unfollowing a club not followed is a no-op.
    async fn unfollow(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error>;

    /// Whether `user` is a member of `club`.
    async fn is_member(&self, user: &UserId, club: &ClubId) -> Result<bool, Error>;

    /// Whether `user` follows `club`.
    async fn is_follower(&self, user: &UserId, club: &ClubId) -> Result<bool, Error>;

    /// Whether `user` administers `club`.
    async fn is_admin_of(&self, user: &UserId, club: &ClubId) -> Result<bool, Error>;

    /// How the requester relates to `club`. Anonymous requesters get the
    /// default relationship.
    async fn relationship(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
    ) -> Result<ClubRelationship, Error>;

    /// Remove a member from a club the requester administers.
    async fn remove_member(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        user: &UserId,
    ) -> Result<(), Error>;

    /// Members of a club the requester administers.
    async fn list_members(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
    ) -> Result<Vec<ClubMember>, Error>;

    /// Clubs the requester follows or belongs to.
    async fn my_clubs(&self, ctx: &RequestContext) -> Result<MyClubs, Error>;
}
