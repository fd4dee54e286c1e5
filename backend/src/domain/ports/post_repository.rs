//! Port for posts, comments and likes.
use async_trait::async_trait;

use crate::domain::{ClubId, Comment, Post, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError: store "post repository" {}
}

/// Storage for posts and their interactions.
///
/// Every list is ordered by creation time descending, ties by id descending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post.
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Delete a post with its comments and likes.
    async fn delete(&self, id: &PostId) -> Result<bool, PostRepositoryError>;

    /// Posts from clubs `user` follows or belongs to.
    async fn feed_for_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError>;

    /// Posts of one club.
    async fn list_for_club(
        &self,
        club: &ClubId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError>;

    /// Posts written by `author`.
    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostRepositoryError>;

    /// Insert a comment.
    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostRepositoryError>;

    /// Comments on a post, oldest first.
    async fn list_comments(&self, post: &PostId) -> Result<Vec<Comment>, PostRepositoryError>;

    /// Record a like. Returns `true` when the like is new.
    async fn like(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError>;

    /// Remove a like. Returns `true` when a like was removed.
    async fn unlike(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError>;

    /// Number of likes on a post.
    async fn like_count(&self, post: &PostId) -> Result<u64, PostRepositoryError>;
}
