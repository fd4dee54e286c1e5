//! Public browsing of universities and clubs.

use std::sync::Arc;

use async_trait::async_trait;

use super::repository_errors::{map_club_error, map_post_error, map_university_error};
use crate::domain::ports::{
    ClubPage, ClubRepository, Directory, PostRepository, UniversityRepository,
};
use crate::domain::{Club, ClubId, Error, University, UniversityId};

const LATEST_POSTS: usize = 10;

/// Service implementing [`Directory`].
#[derive(Clone)]
pub struct DirectoryService {
    universities: Arc<dyn UniversityRepository>,
    clubs: Arc<dyn ClubRepository>,
    posts: Arc<dyn PostRepository>,
}

impl DirectoryService {
    /// Create the service.
    pub fn new(
        universities: Arc<dyn UniversityRepository>,
        clubs: Arc<dyn ClubRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            universities,
            clubs,
            posts,
        }
    }
}

#[async_trait]
impl Directory for DirectoryService {
    async fn universities(&self) -> Result<Vec<University>, Error> {
        self.universities.list().await.map_err(map_university_error)
    }

    async fn explore(&self, university: Option<UniversityId>) -> Result<Vec<Club>, Error> {
        self.clubs.list(university).await.map_err(map_club_error)
    }

    async fn club_page(&self, club: &ClubId) -> Result<ClubPage, Error> {
        let club = self
            .clubs
            .find_by_id(club)
            .await
            .map_err(map_club_error)?
            .ok_or_else(|| Error::not_found(format!("club {club} not found")))?;
        let university = self
            .universities
            .find_by_id(&club.university)
            .await
            .map_err(map_university_error)?
            .ok_or_else(|| {
                Error::internal(format!("club {} references a missing university", club.id))
            })?;
        let counts = self.clubs.counts(&club.id).await.map_err(map_club_error)?;
        let latest_posts = self
            .posts
            .list_for_club(&club.id, LATEST_POSTS)
            .await
            .map_err(map_post_error)?;
        Ok(ClubPage {
            club,
            university,
            member_count: counts.members,
            follower_count: counts.followers,
            latest_posts,
        })
    }
}
