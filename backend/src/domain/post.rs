//! Club posts, comments and likes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ClubId, CommentId, MediaUrl, PostId, UserId};

/// Maximum post length in characters.
pub const POST_TEXT_MAX: usize = 5000;
/// Maximum comment length in characters.
pub const COMMENT_TEXT_MAX: usize = 2000;

/// Default number of posts returned by feeds.
pub const DEFAULT_FEED_LIMIT: usize = 50;
/// Largest page a caller may request.
pub const MAX_FEED_LIMIT: usize = 200;

/// Validation errors for post and comment bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    /// Blank text.
    Empty,
    /// Text longer than the limit.
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for TextValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "text must not be empty"),
            Self::TooLong { max } => write!(f, "text must be at most {max} characters"),
        }
    }
}

impl std::error::Error for TextValidationError {}

/// Trimmed, non-empty text bounded by a maximum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Validate post text.
    pub fn post(raw: &str) -> Result<Self, TextValidationError> {
        Self::bounded(raw, POST_TEXT_MAX)
    }

    /// Validate comment text.
    pub fn comment(raw: &str) -> Result<Self, TextValidationError> {
        Self::bounded(raw, COMMENT_TEXT_MAX)
    }

    fn bounded(raw: &str, max: usize) -> Result<Self, TextValidationError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(TextValidationError::Empty);
        }
        if text.chars().count() > max {
            return Err(TextValidationError::TooLong { max });
        }
        Ok(Self(text.to_owned()))
    }

    /// Consume the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PostText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A post published in a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable identifier.
    pub id: PostId,
    /// Club the post belongs to.
    pub club: ClubId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub text: String,
    /// Attached image, if any.
    pub image_url: Option<MediaUrl>,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Stable identifier.
    pub id: CommentId,
    /// Post commented on.
    pub post: PostId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub text: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Clamp a requested page size to the accepted range.
///
/// # Examples
/// ```
/// use campus_clubs::domain::clamp_feed_limit;
///
/// assert_eq!(clamp_feed_limit(None, 50), 50);
/// assert_eq!(clamp_feed_limit(Some(0), 50), 1);
/// assert_eq!(clamp_feed_limit(Some(10_000), 50), 200);
/// ```
#[must_use]
pub fn clamp_feed_limit(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_FEED_LIMIT)
}

/// Sort newest first, ties broken by post id descending.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn post_at(id: u128, created_at: DateTime<Utc>) -> Post {
        Post {
            id: PostId::from_uuid(Uuid::from_u128(id)),
            club: ClubId::random(),
            author: UserId::random(),
            text: "hello".into(),
            image_url: None,
            created_at,
        }
    }

    #[rstest]
    #[case("   ", Err(TextValidationError::Empty))]
    #[case("  hi  ", Ok("hi"))]
    fn post_text_is_trimmed(#[case] raw: &str, #[case] expected: Result<&str, TextValidationError>) {
        let actual = PostText::post(raw).map(PostText::into_inner);
        assert_eq!(actual, expected.map(str::to_owned));
    }

    #[rstest]
    fn comment_limit_is_shorter_than_post_limit() {
        let text = "x".repeat(COMMENT_TEXT_MAX + 1);
        assert!(PostText::post(&text).is_ok());
        assert_eq!(
            PostText::comment(&text),
            Err(TextValidationError::TooLong {
                max: COMMENT_TEXT_MAX
            })
        );
    }

    #[rstest]
    fn equal_timestamps_order_by_id_descending() {
        let now = Utc::now();
        let mut posts = vec![post_at(1, now), post_at(3, now), post_at(2, now)];

        sort_newest_first(&mut posts);

        let ids: Vec<_> = posts.iter().map(|p| p.id.as_uuid().as_u128()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[rstest]
    #[case(None, 50)]
    #[case(Some(25), 25)]
    #[case(Some(0), 1)]
    #[case(Some(201), MAX_FEED_LIMIT)]
    fn feed_limit_is_clamped(#[case] requested: Option<usize>, #[case] expected: usize) {
        assert_eq!(clamp_feed_limit(requested, DEFAULT_FEED_LIMIT), expected);
    }
}
