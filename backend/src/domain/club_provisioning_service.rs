//! University administration: provisioning and deleting clubs.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::repository_errors::{
    map_club_error, map_hash_error, map_post_error, map_university_error,
};
use crate::domain::ports::{
    ClubProvisioning, ClubRepository, CredentialHasher, MediaStorage, PostRepository,
    UniversityRepository,
};
use crate::domain::{
    Action, AuthorizationGate, Club, ClubId, Error, MediaName, MediaUrl, NewClubRequest,
    Principal, RequestContext, Role, RouteScope, University, UniversityScope, User, UserAccount,
    UserId,
};

/// Service implementing [`ClubProvisioning`].
#[derive(Clone)]
pub struct ClubProvisioningService {
    clubs: Arc<dyn ClubRepository>,
    universities: Arc<dyn UniversityRepository>,
    posts: Arc<dyn PostRepository>,
    media: Arc<dyn MediaStorage>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl ClubProvisioningService {
    /// Create the service.
    pub fn new(
        clubs: Arc<dyn ClubRepository>,
        universities: Arc<dyn UniversityRepository>,
        posts: Arc<dyn PostRepository>,
        media: Arc<dyn MediaStorage>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            clubs,
            universities,
            posts,
            media,
            hasher,
            clock,
        }
    }

    /// Stored images attached to the club's posts.
    async fn club_images(&self, club: &ClubId) -> Result<Vec<MediaName>, Error> {
        let posts = self
            .posts
            .list_for_club(club, usize::MAX)
            .await
            .map_err(map_post_error)?;
        Ok(posts
            .iter()
            .filter_map(|post| post.image_url.as_ref().and_then(MediaUrl::media_name))
            .collect())
    }
}

#[async_trait]
impl ClubProvisioning for ClubProvisioningService {
    async fn create_club(
        &self,
        ctx: &RequestContext,
        request: NewClubRequest,
    ) -> Result<Club, Error> {
        ctx.acting(Action::ManageUniversity {
            university: Some(request.university),
        })?;
        let university = self
            .universities
            .find_by_id(&request.university)
            .await
            .map_err(map_university_error)?
            .ok_or_else(|| Error::not_found(format!("university {} not found", request.university)))?;

        let admin = UserAccount {
            user: User {
                id: UserId::random(),
                email: request.admin_email,
                role: Role::ClubAdmin,
                university: Some(university.id),
            },
            password_hash: self
                .hasher
                .hash(&request.admin_password)
                .map_err(map_hash_error)?,
        };
        let club = Club {
            id: ClubId::random(),
            name: request.details.name().to_owned(),
            description: request.details.description().to_owned(),
            university: university.id,
            admin: admin.user.id,
            created_at: self.clock.utc(),
        };
        self.clubs
            .create_with_admin(&club, &admin)
            .await
            .map_err(map_club_error)?;
        info!(
            club_id = %club.id,
            user_id = %admin.user.id,
            university_id = %university.id,
            "club provisioned"
        );
        Ok(club)
    }

    async fn delete_club(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error> {
        let scope = Action::ManageUniversity { university: None };
        AuthorizationGate::authorize_scope(ctx, RouteScope::UniversityAdmin).into_result(scope)?;
        let stored = self
            .clubs
            .find_by_id(club)
            .await
            .map_err(map_club_error)?
            .ok_or_else(|| Error::not_found(format!("club {club} not found")))?;
        ctx.acting(Action::ManageUniversity {
            university: Some(stored.university),
        })?;
        let images = self.club_images(club).await?;
        let deleted = self
            .clubs
            .delete_cascading(club)
            .await
            .map_err(map_club_error)?;
        if !deleted {
            return Err(Error::not_found(format!("club {club} not found")));
        }
        for name in &images {
            if let Err(error) = self.media.remove(name).await {
                warn!(file = %name, %error, "orphaned upload left in storage");
            }
        }
        info!(club_id = %club, images = images.len(), "club deleted");
        Ok(())
    }

    async fn managed_clubs(&self, ctx: &RequestContext) -> Result<Vec<Club>, Error> {
        let action = Action::ManageUniversity { university: None };
        AuthorizationGate::authorize_scope(ctx, RouteScope::UniversityAdmin).into_result(action)?;
        let filter = match ctx.principal() {
            Some(Principal::UniversityAdmin {
                scope: UniversityScope::University(id),
                ..
            }) => Some(*id),
            _ => None,
        };
        self.clubs.list(filter).await.map_err(map_club_error)
    }

    async fn create_university(
        &self,
        ctx: &RequestContext,
        name: &str,
        country_code: &str,
    ) -> Result<University, Error> {
        ctx.acting(Action::ManageUniversity { university: None })?;
        let university = University::try_new(name, country_code)
            .map_err(|err| Error::validation(err.to_string()))?;
        self.universities
            .insert(&university)
            .await
            .map_err(map_university_error)?;
        info!(university_id = %university.id, "university created");
        Ok(university)
    }
}
