//! Social actions on public club pages.
//!
//! The routes live under the public `/clubs` prefix, so the role gate lets
//! anonymous callers through; the domain answers them with a friendly
//! `unauthenticated` prompt instead.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ClubApplication, ClubId, Comment, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::browse::club_post_ids;
use crate::inbound::http::identity::Requester;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Text body for comments.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentBody {
    /// Comment text, 1 to 2000 characters.
    pub text: String,
}

/// Like count after a like or unlike.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LikeCount {
    /// Number of likes on the post.
    pub likes: u64,
}

fn club_id(path: &str) -> Result<ClubId, Error> {
    parse_id(path, FieldName::new("id"))
}

/// Follow a club.
#[utoipa::path(
    post,
    path = "/clubs/{id}/follow",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 204, description = "Following"),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "Unknown club", body = Error)
    ),
    tags = ["social"],
    operation_id = "followClub"
)]
#[post("/clubs/{id}/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.memberships.follow(&requester, &club_id(&path)?).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stop following a club.
#[utoipa::path(
    delete,
    path = "/clubs/{id}/follow",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 204, description = "Not following"),
        (status = 401, description = "Sign in required", body = Error)
    ),
    tags = ["social"],
    operation_id = "unfollowClub"
)]
#[delete("/clubs/{id}/follow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .memberships
        .unfollow(&requester, &club_id(&path)?)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Apply to join a club.
#[utoipa::path(
    post,
    path = "/clubs/{id}/application",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 201, description = "Pending application", body = ClubApplication),
        (status = 400, description = "Already a member", body = Error),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "Unknown club", body = Error),
        (status = 409, description = "Application already pending", body = Error)
    ),
    tags = ["social"],
    operation_id = "applyToClub"
)]
#[post("/clubs/{id}/application")]
pub async fn apply(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let application = state
        .applications
        .apply(&requester, &club_id(&path)?)
        .await?;
    Ok(HttpResponse::Created().json(application))
}

/// Withdraw a pending application.
#[utoipa::path(
    delete,
    path = "/clubs/{id}/application",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 204, description = "Application withdrawn"),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "No pending application", body = Error)
    ),
    tags = ["social"],
    operation_id = "cancelApplication"
)]
#[delete("/clubs/{id}/application")]
pub async fn cancel_application(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .applications
        .cancel(&requester, &club_id(&path)?)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Comment on a post.
#[utoipa::path(
    post,
    path = "/clubs/{id}/posts/{post}/comments",
    params(
        ("id" = String, Path, description = "Club id"),
        ("post" = String, Path, description = "Post id")
    ),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid text", body = Error),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "Unknown club or post", body = Error)
    ),
    tags = ["social"],
    operation_id = "addComment"
)]
#[post("/clubs/{id}/posts/{post}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<(String, String)>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let (club, post) = club_post_ids(&path)?;
    state.feed.post_in_club(&club, &post).await?;
    let comment = state
        .feed
        .comment(&requester, &post, &payload.text)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Like a post.
#[utoipa::path(
    post,
    path = "/clubs/{id}/posts/{post}/like",
    params(
        ("id" = String, Path, description = "Club id"),
        ("post" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like recorded", body = LikeCount),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "Unknown club or post", body = Error)
    ),
    tags = ["social"],
    operation_id = "likePost"
)]
#[post("/clubs/{id}/posts/{post}/like")]
pub async fn like(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<LikeCount>> {
    let (club, post) = club_post_ids(&path)?;
    state.feed.post_in_club(&club, &post).await?;
    let likes = state.feed.like(&requester, &post).await?;
    Ok(web::Json(LikeCount { likes }))
}

/// Remove a like.
#[utoipa::path(
    delete,
    path = "/clubs/{id}/posts/{post}/like",
    params(
        ("id" = String, Path, description = "Club id"),
        ("post" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like removed", body = LikeCount),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "Unknown club or post", body = Error)
    ),
    tags = ["social"],
    operation_id = "unlikePost"
)]
#[delete("/clubs/{id}/posts/{post}/like")]
pub async fn unlike(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<LikeCount>> {
    let (club, post) = club_post_ids(&path)?;
    state.feed.post_in_club(&club, &post).await?;
    let likes = state.feed.unlike(&requester, &post).await?;
    Ok(web::Json(LikeCount { likes }))
}
