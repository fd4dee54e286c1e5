//! Driving port for the club application workflow.
//!
//! Inbound adapters call this port to apply to clubs, withdraw applications
//! and resolve them as a club admin.

use async_trait::async_trait;

use crate::domain::{
    ApplicationFilter, ApplicationId, ClubApplication, ClubId, Error, RequestContext,
};

/// Apply, cancel, accept and reject club applications.
#[async_trait]
pub trait ApplicationWorkflow: Send + Sync {
    /// Submit a pending application to `club` as the requester.
    async fn apply(&self, ctx: &RequestContext, club: &ClubId)
    -> Result<ClubApplication, Error>;

    /// Withdraw the requester's pending application to `club`.
    async fn cancel(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error>;

    /// Accept a pending application and add the applicant as a member.
    async fn accept(
        &self,
        ctx: &RequestContext,
        application: &ApplicationId,
    ) -> Result<ClubApplication, Error>;

    /// Reject a pending application.
    async fn reject(
        &self,
        ctx: &RequestContext,
        application: &ApplicationId,
    ) -> Result<ClubApplication, Error>;

    /// Applications to a club the requester administers.
    async fn list_for_club(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        filter: ApplicationFilter,
    ) -> Result<Vec<ClubApplication>, Error>;

    /// The requester's own applications.
    async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<ClubApplication>, Error>;
}
