//! Post, comment and like ports over the in-memory store.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::MemoryStore;
use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{ClubId, Comment, Post, PostId, UserId, sort_newest_first};

fn newest(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    sort_newest_first(&mut posts);
    posts.truncate(limit);
    posts
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        self.with_state(PostRepositoryError::query, |state| {
            state.posts.insert(post.id, post.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| state.posts.get(id).cloned())
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostRepositoryError> {
        self.with_state(PostRepositoryError::query, |state| {
            if state.posts.remove(id).is_none() {
                return Ok(false);
            }
            state.cascade_from("posts", &BTreeSet::from([*id.as_uuid()]));
            Ok(true)
        })
    }

    async fn feed_for_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| {
            let followed = state
                .follows
                .iter()
                .filter(|(follower, _)| follower == user)
                .map(|(_, club)| *club);
            let joined = state
                .members
                .keys()
                .filter(|(_, member)| member == user)
                .map(|(club, _)| *club);
            let clubs: BTreeSet<ClubId> = followed.chain(joined).collect();
            let posts = state
                .posts
                .values()
                .filter(|post| clubs.contains(&post.club))
                .cloned()
                .collect();
            newest(posts, limit)
        })
    }

    async fn list_for_club(
        &self,
        club: &ClubId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| {
            let posts = state
                .posts
                .values()
                .filter(|post| &post.club == club)
                .cloned()
                .collect();
            newest(posts, limit)
        })
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| {
            let mut posts: Vec<_> = state
                .posts
                .values()
                .filter(|post| &post.author == author)
                .cloned()
                .collect();
            sort_newest_first(&mut posts);
            posts
        })
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostRepositoryError> {
        self.with_state(PostRepositoryError::query, |state| {
            if !state.posts.contains_key(&comment.post) {
                return Err(PostRepositoryError::query(format!(
                    "post {} does not exist",
                    comment.post
                )));
            }
            state.comments.insert(comment.id, comment.clone());
            Ok(())
        })
    }

    async fn list_comments(&self, post: &PostId) -> Result<Vec<Comment>, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| {
            let mut comments: Vec<_> = state
                .comments
                .values()
                .filter(|comment| &comment.post == post)
                .cloned()
                .collect();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            comments
        })
    }

    async fn like(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError> {
        self.with_state(PostRepositoryError::query, |state| {
            Ok(state.likes.insert((*post, *user)))
        })
    }

    async fn unlike(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError> {
        self.with_state(PostRepositoryError::query, |state| {
            Ok(state.likes.remove(&(*post, *user)))
        })
    }

    async fn like_count(&self, post: &PostId) -> Result<u64, PostRepositoryError> {
        self.read(PostRepositoryError::query, |state| {
            state.likes.iter().filter(|(liked, _)| liked == post).count() as u64
        })
    }
}
