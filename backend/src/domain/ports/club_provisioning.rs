//! Driving port for university administration.

use async_trait::async_trait;

use crate::domain::{Club, ClubId, Error, NewClubRequest, RequestContext, University};

/// Create and delete clubs and universities.
#[async_trait]
pub trait ClubProvisioning: Send + Sync {
    /// Create a club and its admin account atomically.
    async fn create_club(
        &self,
        ctx: &RequestContext,
        request: NewClubRequest,
    ) -> Result<Club, Error>;

    /// Delete a club, applying every cascade rule.
    async fn delete_club(&self, ctx: &RequestContext, club: &ClubId) -> Result<(), Error>;

    /// Clubs the requester may manage.
    async fn managed_clubs(&self, ctx: &RequestContext) -> Result<Vec<Club>, Error>;

    /// Register a university. Global administrators only.
    async fn create_university(
        &self,
        ctx: &RequestContext,
        name: &str,
        country_code: &str,
    ) -> Result<University, Error>;
}
