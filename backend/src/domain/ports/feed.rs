//! Driving port for posts and the student feed.

use async_trait::async_trait;

use crate::domain::{ClubId, Comment, Error, ImageUpload, Post, PostId, RequestContext};

/// Post, comment, like and read feeds.
#[async_trait]
pub trait Feed: Send + Sync {
    /// Posts from clubs the requester follows or belongs to.
    ///
    /// `limit` falls back to the configured default and is clamped.
    async fn feed_for(&self, ctx: &RequestContext, limit: Option<usize>)
    -> Result<Vec<Post>, Error>;

    /// Publish a post in a club the requester belongs to.
    async fn create_post(
        &self,
        ctx: &RequestContext,
        club: &ClubId,
        text: &str,
        image: Option<ImageUpload>,
    ) -> Result<Post, Error>;

    /// Public posts of one club.
    async fn club_posts(&self, club: &ClubId, limit: Option<usize>) -> Result<Vec<Post>, Error>;

    /// Posts the requester wrote.
    async fn my_posts(&self, ctx: &RequestContext) -> Result<Vec<Post>, Error>;

    /// Delete a post as its author or as the admin of its club.
    async fn delete_post(&self, ctx: &RequestContext, post: &PostId) -> Result<(), Error>;

    /// Comment on a post.
    async fn comment(
        &self,
        ctx: &RequestContext,
        post: &PostId,
        text: &str,
    ) -> Result<Comment, Error>;

    /// Comments on a post, oldest first.
    async fn comments(&self, post: &PostId) -> Result<Vec<Comment>, Error>;

    /// Like a post and return the new like count.
    async fn like(&self, ctx: &RequestContext, post: &PostId) -> Result<u64, Error>;

    /// Remove a like and return the new like count.
    async fn unlike(&self, ctx: &RequestContext, post: &PostId) -> Result<u64, Error>;

    /// Load a post, failing with `not_found` unless it belongs to `club`.
    async fn post_in_club(&self, club: &ClubId, post: &PostId) -> Result<Post, Error>;
}
