//! PostgreSQL-backed `PostRepository`.
//!
//! Listings order by `created_at` descending with the post id as tie-breaker
//! so pages are stable when several posts share a timestamp.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{ClubId, Comment, CommentId, MediaUrl, Post, PostId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CommentRow, NewLikeRow, PostRow};
use super::pool::{DbPool, PoolError};
use super::schema::{club_members, follows, post_comments, post_likes, posts};

/// Diesel-backed implementation of the post repository port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    map_basic_pool_error(error, PostRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostRepositoryError {
    map_basic_diesel_error(
        error,
        PostRepositoryError::query,
        PostRepositoryError::connection,
    )
}

fn row_to_post(row: PostRow) -> Post {
    Post {
        id: PostId::from_uuid(row.id),
        club: ClubId::from_uuid(row.club_id),
        author: UserId::from_uuid(row.author_id),
        text: row.text,
        image_url: row.image_url.map(MediaUrl::from_storage),
        created_at: row.created_at,
    }
}

fn rows_to_posts(rows: Vec<PostRow>) -> Vec<Post> {
    rows.into_iter().map(row_to_post).collect()
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(posts::table)
            .values(&PostRow {
                id: *post.id.as_uuid(),
                club_id: *post.club.as_uuid(),
                author_id: *post.author.as_uuid(),
                text: post.text.clone(),
                image_url: post.image_url.as_ref().map(ToString::to_string),
                created_at: post.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = posts::table
            .find(*id.as_uuid())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_post))
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(posts::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn feed_for_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let followed = follows::table
            .filter(follows::user_id.eq(user_id))
            .select(follows::club_id);
        let joined = club_members::table
            .filter(club_members::user_id.eq(user_id))
            .select(club_members::club_id);
        let rows = posts::table
            .filter(
                posts::club_id
                    .eq_any(followed)
                    .or(posts::club_id.eq_any(joined)),
            )
            .select(PostRow::as_select())
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(sql_limit(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_posts(rows))
    }

    async fn list_for_club(
        &self,
        club: &ClubId,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = posts::table
            .filter(posts::club_id.eq(*club.as_uuid()))
            .select(PostRow::as_select())
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(sql_limit(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_posts(rows))
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = posts::table
            .filter(posts::author_id.eq(*author.as_uuid()))
            .select(PostRow::as_select())
            .order((posts::created_at.desc(), posts::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_posts(rows))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(post_comments::table)
            .values(&CommentRow {
                id: *comment.id.as_uuid(),
                post_id: *comment.post.as_uuid(),
                author_id: *comment.author.as_uuid(),
                text: comment.text.clone(),
                created_at: comment.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_comments(&self, post: &PostId) -> Result<Vec<Comment>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = post_comments::table
            .filter(post_comments::post_id.eq(*post.as_uuid()))
            .select(CommentRow::as_select())
            .order((post_comments::created_at.asc(), post_comments::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| Comment {
                id: CommentId::from_uuid(row.id),
                post: PostId::from_uuid(row.post_id),
                author: UserId::from_uuid(row.author_id),
                text: row.text,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn like(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(post_likes::table)
            .values(&NewLikeRow {
                post_id: *post.as_uuid(),
                user_id: *user.as_uuid(),
            })
            .on_conflict((post_likes::post_id, post_likes::user_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn unlike(&self, user: &UserId, post: &PostId) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            post_likes::table
                .filter(post_likes::post_id.eq(*post.as_uuid()))
                .filter(post_likes::user_id.eq(*user.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn like_count(&self, post: &PostId) -> Result<u64, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let likes: i64 = post_likes::table
            .filter(post_likes::post_id.eq(*post.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(likes).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn image_urls_are_carried_through() {
        let row = PostRow {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            text: "hello".into(),
            image_url: Some("/uploads/a.png".into()),
            created_at: Utc::now(),
        };

        let post = row_to_post(row);

        assert_eq!(
            post.image_url.map(|url| url.to_string()),
            Some("/uploads/a.png".to_owned())
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(200, 200)]
    #[case(usize::MAX, i64::MAX)]
    fn limits_fit_into_sql(#[case] limit: usize, #[case] expected: i64) {
        assert_eq!(sql_limit(limit), expected);
    }
}
