//! Post and feed aggregation.
//!
//! A student's feed merges posts from every club they follow or belong to.
//! Only members may post in a club; images are stored through the media port
//! and only the resulting URL is kept on the post.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::repository_errors::{
    map_club_error, map_media_error, map_membership_error, map_post_error,
};
use crate::domain::ports::{ClubRepository, Feed, MediaStorage, MembershipRepository, PostRepository};
use crate::domain::{
    Action, Club, ClubId, Comment, CommentId, DEFAULT_FEED_LIMIT, Error, ImageUpload, MediaName,
    MediaUrl, Post, PostId, PostText, RequestContext, SocialAction, clamp_feed_limit,
};

/// Service implementing [`Feed`].
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    clubs: Arc<dyn ClubRepository>,
    memberships: Arc<dyn MembershipRepository>,
    media: Arc<dyn MediaStorage>,
    clock: Arc<dyn Clock>,
    default_limit: usize,
}

impl FeedService {
    /// Create the service with the default page size.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        clubs: Arc<dyn ClubRepository>,
        memberships: Arc<dyn MembershipRepository>,
        media: Arc<dyn MediaStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            clubs,
            memberships,
            media,
            clock,
            default_limit: DEFAULT_FEED_LIMIT,
        }
    }

    /// Override the page size used when callers do not ask for one.
    #[must_use]
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = clamp_feed_limit(Some(limit), DEFAULT_FEED_LIMIT);
        self
    }

    async fn load_club(&self, id: &ClubId) -> Result<Club, Error> {
        self.clubs
            .find_by_id(id)
            .await
            .map_err(map_club_error)?
            .ok_or_else(|| Error::not_found(format!("club {id} not found")))
    }

    async fn load_post(&self, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))
    }

    /// Best-effort removal of an image no post refers to any more.
    async fn discard_image(&self, name: &MediaName) {
        if let Err(error) = self.media.remove(name).await {
            warn!(file = %name, %error, "orphaned upload left in storage");
        }
    }

    async fn like_count(&self, post: &PostId) -> Result<u64, Error> {
        self.posts.like_count(post).await.map_err(map_post_error)
    }
}

#[async_trait]
impl Feed for FeedService {
    async fn feed_for(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, Error> {
        let user = ctx.acting(Action::StudentArea)?.user_id();
        let limit = clamp_feed_limit(limit, self.default_limit);
        self.posts
            .feed_for_user(&user, limit)
            .await
            .map_err(map_post_error)
    }

    async fn create_post(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        text: &str,
        image: Option<ImageUpload>,
    ) -> Result<Post, Error> {
        let author = ctx.acting(Action::Social(SocialAction::Post))?.user_id();
        let club = self.load_club(club).await?;
        let text = PostText::post(text).map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({ "field": "text" }))
        })?;
        let member = self
            .memberships
            .is_member(&author, &club.id)
            .await
            .map_err(map_membership_error)?;
        if !member {
            return Err(
                Error::validation(format!("only members of {} can post there", club.name))
                    .with_details(json!({ "code": "not_a_member", "clubId": club.id })),
            );
        }

        let stored_image = match image {
            Some(image) => Some(self.media.store(&image).await.map_err(map_media_error)?),
            None => None,
        };
        let post = Post {
            id: PostId::random(),
            club: club.id,
            author,
            text: text.into_inner(),
            image_url: stored_image.map(|name| name.url()),
            created_at: self.clock.utc(),
        };
        if let Err(error) = self.posts.insert(&post).await {
            if let Some(name) = stored_image {
                self.discard_image(&name).await;
            }
            return Err(map_post_error(error));
        }
        info!(post_id = %post.id, club_id = %club.id, user_id = %author, "post published");
        Ok(post)
    }

    async fn club_posts(&self, club: &ClubId, limit: Option<usize>) -> Result<Vec<Post>, Error> {
        let club = self.load_club(club).await?;
        self.posts
            .list_for_club(&club.id, clamp_feed_limit(limit, self.default_limit))
            .await
            .map_err(map_post_error)
    }

    async fn my_posts(&self, ctx: &RequestContext) -> Result<Vec<Post>, Error> {
        let user = ctx.acting(Action::StudentArea)?.user_id();
        self.posts.list_by_author(&user).await.map_err(map_post_error)
    }

    async fn delete_post(&self, ctx: &RequestContext, post: &PostId) -> Result<(), Error> {
        let user = ctx.acting(Action::Social(SocialAction::Post))?.user_id();
        let post = self.load_post(post).await?;
        if post.author != user {
            let club = self.load_club(&post.club).await?;
            if !club.is_administered_by(&user) {
                return Err(Error::not_owner(
                    "only the author or the club admin can delete this post",
                ));
            }
        }
        self.posts.delete(&post.id).await.map_err(map_post_error)?;
        if let Some(name) = post.image_url.as_ref().and_then(MediaUrl::media_name) {
            self.discard_image(&name).await;
        }
        info!(post_id = %post.id, club_id = %post.club, user_id = %user, "post deleted");
        Ok(())
    }

    async fn comment(
        &self,
        ctx: &RequestContext,
        post: &PostId,
        text: &str,
    ) -> Result<Comment, Error> {
        let author = ctx.acting(Action::Social(SocialAction::Comment))?.user_id();
        let post = self.load_post(post).await?;
        let text = PostText::comment(text).map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({ "field": "text" }))
        })?;
        let comment = Comment {
            id: CommentId::random(),
            post: post.id,
            author,
            text: text.into_inner(),
            created_at: self.clock.utc(),
        };
        self.posts
            .insert_comment(&comment)
            .await
            .map_err(map_post_error)?;
        Ok(comment)
    }

    async fn comments(&self, post: &PostId) -> Result<Vec<Comment>, Error> {
        let post = self.load_post(post).await?;
        self.posts
            .list_comments(&post.id)
            .await
            .map_err(map_post_error)
    }

    async fn like(&self, ctx: &RequestContext, post: &PostId) -> Result<u64, Error> {
        let user = ctx.acting(Action::Social(SocialAction::Like))?.user_id();
        let post = self.load_post(post).await?;
        self.posts
            .like(&user, &post.id)
            .await
            .map_err(map_post_error)?;
        self.like_count(&post.id).await
    }

    async fn unlike(&self, ctx: &RequestContext, post: &PostId) -> Result<u64, Error> {
        let user = ctx.acting(Action::Social(SocialAction::Like))?.user_id();
        let post = self.load_post(post).await?;
        self.posts
            .unlike(&user, &post.id)
            .await
            .map_err(map_post_error)?;
        self.like_count(&post.id).await
    }

    async fn post_in_club(&self, club: &ClubId, post: &PostId) -> Result<Post, Error> {
        let post = self.load_post(post).await?;
        if post.club != *club {
            return Err(Error::not_found(format!("post {} not found", post.id)));
        }
        Ok(post)
    }
}
