//! Follow and membership service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::repository_errors::{map_application_error, map_club_error, map_membership_error};
use crate::domain::ports::{
    ApplicationRepository, ClubRepository, MembershipRepository, Memberships,
};
use crate::domain::{
    Action, AuthorizationGate, Club, ClubId, ClubMember, ClubRelationship, Error, MyClubs,
    RequestContext, SocialAction, UserId,
};

/// Service implementing [`Memberships`].
#[derive(Clone)]
pub struct MembershipService {
    clubs: Arc<dyn ClubRepository>,
    memberships: Arc<dyn MembershipRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl MembershipService {
    /// Create the service.
    pub fn new(
        clubs: Arc<dyn ClubRepository>,
        memberships: Arc<dyn MembershipRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            clubs,
            memberships,
            applications,
        }
    }

    async fn load_club(&self, id: &ClubId) -> Result<Club, Error> {
        self.clubs
            .find_by_id(id)
            .await
            .map_err(map_club_error)?
            .ok_or_else(|| Error::not_found(format!("club {id} not found")))
    }

    async fn owned_club(&self, ctx: &RequestContext, id: &ClubId) -> Result<Club, Error> {
        let club = self.load_club(id).await?;
        let action = Action::ManageClub { admin: club.admin };
        AuthorizationGate::authorize(ctx, action).into_result(action)?;
        Ok(club)
    }
}

#[async_trait]
impl Memberships for MembershipService {
    async fn follow(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error> {
        let user = ctx.acting(Action::Social(SocialAction::Follow))?.user_id();
        let club = self.load_club(club).await?;
        let created = self
            .memberships
            .follow(&user, &club.id)
            .await
            .map_err(map_membership_error)?;
        if created {
            info!(user_id = %user, club_id = %club.id, "club followed");
        }
        Ok(())
    }

    async fn unfollow(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error> {
        let user = ctx.acting(Action::Social(SocialAction::Follow))?.user_id();
        let removed = self
            .memberships
            .unfollow(&user, club)
            .await
            .map_err(map_membership_error)?;
        if removed {
            info!(user_id = %user, club_id = %club, "club unfollowed");
        }
        Ok(())
    }

    async fn is_member(&self, user: &UserId, club: &ClubId) -> Result<bool, Error> {
        self.memberships
            .is_member(user, club)
            .await
            .map_err(map_membership_error)
    }

    async fn is_follower(&self, user: &UserId, club: &ClubId) -> Result<bool, Error> {
        self.memberships
            .is_follower(user, club)
            .await
            .map_err(map_membership_error)
    }

    async fn is_admin_of(&self, user: &UserId, club: &ClubId) -> Result<bool, Error> {
        let club = self.clubs.find_by_id(club).await.map_err(map_club_error)?;
        Ok(club.is_some_and(|club| club.is_administered_by(user)))
    }

    async fn relationship(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
    ) -> Result<ClubRelationship, Error> {
        let Some(principal) = ctx.principal() else {
            return Ok(ClubRelationship::default());
        };
        let user = principal.user_id();
        let pending_application = self
            .applications
            .find_pending(&user, club)
            .await
            .map_err(map_application_error)?
            .is_some();
        Ok(ClubRelationship {
            following: self.is_follower(&user, club).await?,
            member: self.is_member(&user, club).await?,
            pending_application,
            admin: self.is_admin_of(&user, club).await?,
        })
    }

    async fn remove_member(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        user: &UserId,
    ) -> Result<(), Error> {
        let club = self.owned_club(ctx, club).await?;
        let removed = self
            .memberships
            .remove_member(&club.id, user)
            .await
            .map_err(map_membership_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "user {user} is not a member of {}",
                club.name
            )));
        }
        info!(user_id = %user, club_id = %club.id, "member removed");
        Ok(())
    }

    async fn list_members(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
    ) -> Result<Vec<ClubMember>, Error> {
        let club = self.owned_club(ctx, club).await?;
        self.memberships
            .list_members(&club.id)
            .await
            .map_err(map_membership_error)
    }

    async fn my_clubs(&self, ctx: &RequestContext) -> Result<MyClubs, Error> {
        let user = ctx.acting(Action::StudentArea)?.user_id();
        let following = self
            .memberships
            .followed_clubs(&user)
            .await
            .map_err(map_membership_error)?;
        let member_of = self
            .memberships
            .joined_clubs(&user)
            .await
            .map_err(map_membership_error)?;
        Ok(MyClubs {
            following,
            member_of,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        MockApplicationRepository, MockClubRepository, MockMembershipRepository,
    };
    use crate::domain::{ErrorCode, Principal, UniversityId};
    use chrono::Utc;
    use rstest::rstest;

    fn club(admin: UserId) -> Club {
        Club {
            id: ClubId::random(),
            name: "Film Society".into(),
            description: String::new(),
            university: UniversityId::random(),
            admin,
            created_at: Utc::now(),
        }
    }

    fn service(
        clubs: MockClubRepository,
        memberships: MockMembershipRepository,
    ) -> MembershipService {
        MembershipService::new(
            Arc::new(clubs),
            Arc::new(memberships),
            Arc::new(MockApplicationRepository::new()),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn following_twice_is_a_no_op() {
        let club = club(UserId::random());
        let id = club.id;
        let mut clubs = MockClubRepository::new();
        clubs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(club.clone())));
        let mut memberships = MockMembershipRepository::new();
        let mut calls = 0;
        memberships.expect_follow().times(2).returning(move |_, _| {
            calls += 1;
            Ok(calls == 1)
        });
        let ctx = RequestContext::authenticated(Principal::Student {
            id: UserId::random(),
            university: UniversityId::random(),
        });
        let service = service(clubs, memberships);

        service.follow(&ctx, &id).await.expect("first follow");
        service.follow(&ctx, &id).await.expect("second follow");
    }

    #[rstest]
    #[tokio::test]
    async fn follow_needs_identity() {
        let error = service(MockClubRepository::new(), MockMembershipRepository::new())
            .follow(&RequestContext::anonymous(), &ClubId::random())
            .await
            .expect_err("anonymous");

        assert_eq!(error.code(), ErrorCode::Unauthenticated);
        assert_eq!(
            error.message(),
            "sign in to follow clubs",
        );
    }

    #[rstest]
    #[tokio::test]
    async fn only_the_owner_lists_members() {
        let club = club(UserId::random());
        let id = club.id;
        let university = club.university;
        let mut clubs = MockClubRepository::new();
        clubs
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(club)));
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_list_members().times(0);
        let other_admin = RequestContext::authenticated(Principal::ClubAdmin {
            id: UserId::random(),
            university,
        });

        let error = service(clubs, memberships)
            .list_members(&other_admin, &id)
            .await
            .expect_err("not the owner");

        assert_eq!(error.code(), ErrorCode::NotOwner);
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_relationship_is_empty() {
        let relationship = service(MockClubRepository::new(), MockMembershipRepository::new())
            .relationship(&RequestContext::anonymous(), &ClubId::random())
            .await
            .expect("anonymous browse");

        assert_eq!(relationship, ClubRelationship::default());
    }

    #[rstest]
    #[tokio::test]
    async fn admin_check_reads_the_club() {
        let admin = UserId::random();
        let club = club(admin);
        let id = club.id;
        let mut clubs = MockClubRepository::new();
        clubs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(club.clone())));
        let service = service(clubs, MockMembershipRepository::new());

        assert!(service.is_admin_of(&admin, &id).await.expect("query"));
        assert!(!service.is_admin_of(&UserId::random(), &id).await.expect("query"));
    }
}
