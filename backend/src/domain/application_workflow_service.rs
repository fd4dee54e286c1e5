//! Club application workflow.
//!
//! Students apply to clubs and may withdraw while the application is pending.
//! The club's admin accepts or rejects it exactly once; acceptance creates the
//! membership in the same storage transaction as the status change. The
//! applicant is notified after the transition is committed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::repository_errors::{map_application_error, map_club_error, map_membership_error};
use crate::domain::ports::{
    ApplicationRepository, ApplicationWorkflow, ClubRepository, MembershipRepository,
    Notifications,
};
use crate::domain::{
    Action, ApplicationFilter, ApplicationId, AuthorizationGate, Club, ClubApplication, ClubId,
    Error, RequestContext, Resolution, ResolveOutcome, SocialAction, resolution_message,
};

/// Service implementing [`ApplicationWorkflow`].
#[derive(Clone)]
pub struct ApplicationWorkflowService {
    clubs: Arc<dyn ClubRepository>,
    memberships: Arc<dyn MembershipRepository>,
    applications: Arc<dyn ApplicationRepository>,
    notifications: Arc<dyn Notifications>,
    clock: Arc<dyn Clock>,
}

impl ApplicationWorkflowService {
    /// Create the service.
    pub fn new(
        clubs: Arc<dyn ClubRepository>,
        memberships: Arc<dyn MembershipRepository>,
        applications: Arc<dyn ApplicationRepository>,
        notifications: Arc<dyn Notifications>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            clubs,
            memberships,
            applications,
            notifications,
            clock,
        }
    }

    async fn load_club(&self, id: &ClubId) -> Result<Club, Error> {
        self.clubs
            .find_by_id(id)
            .await
            .map_err(map_club_error)?
            .ok_or_else(|| Error::not_found(format!("club {id} not found")))
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        id: &ApplicationId,
        resolution: Resolution,
    ) -> Result<ClubApplication, Error> {
        let application = self
            .applications
            .find_by_id(id)
            .await
            .map_err(map_application_error)?
            .ok_or_else(|| Error::not_found(format!("application {id} not found")))?;
        let club = self.load_club(&application.club).await?;
        let action = Action::ManageClub { admin: club.admin };
        AuthorizationGate::authorize(ctx, action).into_result(action)?;

        let outcome = self
            .applications
            .resolve_pending(id, resolution, self.clock.utc())
            .await
            .map_err(map_application_error)?;
        let resolved = match outcome {
            ResolveOutcome::Resolved(resolved) => resolved,
            ResolveOutcome::AlreadyResolved => {
                return Err(Error::already_resolved(format!(
                    "application {id} has already been resolved"
                )));
            }
            ResolveOutcome::Missing => {
                return Err(Error::not_found(format!("application {id} not found")));
            }
        };
        info!(
            application_id = %resolved.id,
            club_id = %resolved.club,
            user_id = %resolved.user,
            status = %resolved.status,
            "application resolved"
        );

        self.notifications
            .emit(
                &resolved.user,
                &resolution_message(&club.name, resolution),
                Some(resolved.id),
            )
            .await?;
        Ok(resolved)
    }
}

#[async_trait]
impl ApplicationWorkflow for ApplicationWorkflowService {
    async fn apply(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
    ) -> Result<ClubApplication, Error> {
        let user = ctx.acting(Action::Social(SocialAction::Apply))?.user_id();
        let club = self.load_club(club).await?;
        if club.admin == user {
            return Err(
                Error::validation(format!("you administer {} and cannot apply to it", club.name))
                    .with_details(json!({ "code": "own_club", "clubId": club.id })),
            );
        }

        let already_member = self
            .memberships
            .is_member(&user, &club.id)
            .await
            .map_err(map_membership_error)?;
        if already_member {
            return Err(
                Error::validation(format!("you are already a member of {}", club.name))
                    .with_details(json!({ "code": "already_member", "clubId": club.id })),
            );
        }
        let pending = self
            .applications
            .find_pending(&user, &club.id)
            .await
            .map_err(map_application_error)?;
        if pending.is_some() {
            return Err(Error::duplicate_pending_application(format!(
                "you already have a pending application to {}",
                club.name
            )));
        }

        let application = ClubApplication::pending(user, club.id, self.clock.utc());
        self.applications
            .insert_pending(&application)
            .await
            .map_err(map_application_error)?;
        info!(
            application_id = %application.id,
            club_id = %club.id,
            user_id = %user,
            "application submitted"
        );
        Ok(application)
    }

    async fn cancel(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error> {
        let user = ctx.acting(Action::Social(SocialAction::Apply))?.user_id();
        let removed = self
            .applications
            .delete_pending(&user, club)
            .await
            .map_err(map_application_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "no pending application to club {club}"
            )));
        }
        info!(club_id = %club, user_id = %user, "application withdrawn");
        Ok(())
    }

    async fn accept(
        &self,
        ctx: &RequestContext,
        application: &ApplicationId,
    ) -> Result<ClubApplication, Error> {
        self.resolve(ctx, application, Resolution::Accept).await
    }

    async fn reject(
        &self,
        ctx: &RequestContext,
        application: &ApplicationId,
    ) -> Result<ClubApplication, Error> {
        self.resolve(ctx, application, Resolution::Reject).await
    }

    async fn list_for_club(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        filter: ApplicationFilter,
    ) -> Result<Vec<ClubApplication>, Error> {
        let club = self.load_club(club).await?;
        let action = Action::ManageClub { admin: club.admin };
        AuthorizationGate::authorize(ctx, action).into_result(action)?;
        let applications = self
            .applications
            .list_for_club(&club.id)
            .await
            .map_err(map_application_error)?;
        Ok(applications
            .into_iter()
            .filter(|application| filter.admits(application))
            .collect())
    }

    async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<ClubApplication>, Error> {
        let user = ctx.acting(Action::StudentArea)?.user_id();
        self.applications
            .list_for_user(&user)
            .await
            .map_err(map_application_error)
    }
}

#[cfg(test)]
#[path = "application_workflow_service_tests.rs"]
mod tests;
