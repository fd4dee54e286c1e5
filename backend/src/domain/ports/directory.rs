//! Driving port for public browsing.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Club, ClubId, Error, Post, University, UniversityId};

/// Everything shown on a public club page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubPage {
    /// The club.
    pub club: Club,
    /// Its university.
    pub university: University,
    /// Number of members.
    pub member_count: u64,
    /// Number of followers.
    pub follower_count: u64,
    /// Latest posts, newest first.
    pub latest_posts: Vec<Post>,
}

/// Read-only browsing of universities and clubs.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Every university.
    async fn universities(&self) -> Result<Vec<University>, Error>;

    /// Clubs, optionally restricted to one university.
    async fn explore(&self, university: Option<UniversityId>) -> Result<Vec<Club>, Error>;

    /// Public page of one club.
    async fn club_page(&self, club: &ClubId) -> Result<ClubPage, Error>;
}
