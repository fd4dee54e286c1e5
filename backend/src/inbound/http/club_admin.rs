//! Club administration: application decisions, members and moderation.
//!
//! The role gate admits club admins only; the domain then checks that the
//! caller administers the club in question.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;

use crate::domain::{
    ApplicationFilter, ApplicationId, ClubApplication, ClubId, ClubMember, Error, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::browse::club_post_ids;
use crate::inbound::http::identity::Requester;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Application listing filter.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ApplicationQuery {
    /// `pending` (default) or `all`.
    pub status: Option<ApplicationFilter>,
}

fn application_id(path: &str) -> Result<ApplicationId, Error> {
    parse_id(path, FieldName::new("id"))
}

/// Applications to a club the caller administers.
#[utoipa::path(
    get,
    path = "/club/{id}/applications",
    params(("id" = String, Path, description = "Club id"), ApplicationQuery),
    responses(
        (status = 200, description = "Applications", body = [ClubApplication]),
        (status = 403, description = "Not this club's admin", body = Error),
        (status = 404, description = "Unknown club", body = Error)
    ),
    tags = ["club"],
    operation_id = "clubApplications"
)]
#[get("/club/{id}/applications")]
pub async fn club_applications(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
    query: web::Query<ApplicationQuery>,
) -> ApiResult<web::Json<Vec<ClubApplication>>> {
    let club: ClubId = parse_id(&path, FieldName::new("id"))?;
    let filter = query.status.unwrap_or_default();
    Ok(web::Json(
        state
            .applications
            .list_for_club(&requester, &club, filter)
            .await?,
    ))
}

/// Accept a pending application.
#[utoipa::path(
    post,
    path = "/club/applications/{id}/accept",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application accepted", body = ClubApplication),
        (status = 403, description = "Not this club's admin", body = Error),
        (status = 404, description = "Unknown application", body = Error),
        (status = 409, description = "Already resolved", body = Error)
    ),
    tags = ["club"],
    operation_id = "acceptApplication"
)]
#[post("/club/applications/{id}/accept")]
pub async fn accept(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClubApplication>> {
    let id = application_id(&path)?;
    Ok(web::Json(state.applications.accept(&requester, &id).await?))
}

/// Reject a pending application.
#[utoipa::path(
    post,
    path = "/club/applications/{id}/reject",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application rejected", body = ClubApplication),
        (status = 403, description = "Not this club's admin", body = Error),
        (status = 404, description = "Unknown application", body = Error),
        (status = 409, description = "Already resolved", body = Error)
    ),
    tags = ["club"],
    operation_id = "rejectApplication"
)]
#[post("/club/applications/{id}/reject")]
pub async fn reject(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClubApplication>> {
    let id = application_id(&path)?;
    Ok(web::Json(state.applications.reject(&requester, &id).await?))
}

/// Members of a club the caller administers.
#[utoipa::path(
    get,
    path = "/club/{id}/members",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Members", body = [ClubMember]),
        (status = 403, description = "Not this club's admin", body = Error)
    ),
    tags = ["club"],
    operation_id = "clubMembers"
)]
#[get("/club/{id}/members")]
pub async fn members(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ClubMember>>> {
    let club: ClubId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.memberships.list_members(&requester, &club).await?))
}

/// Remove a member.
#[utoipa::path(
    delete,
    path = "/club/{id}/members/{user}",
    params(
        ("id" = String, Path, description = "Club id"),
        ("user" = String, Path, description = "Member's user id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Not this club's admin", body = Error),
        (status = 404, description = "Not a member", body = Error)
    ),
    tags = ["club"],
    operation_id = "removeMember"
)]
#[delete("/club/{id}/members/{user}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_club, raw_user) = path.into_inner();
    let club: ClubId = parse_id(&raw_club, FieldName::new("id"))?;
    let user: UserId = parse_id(&raw_user, FieldName::new("user"))?;
    state
        .memberships
        .remove_member(&requester, &club, &user)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a post in a club the caller administers.
#[utoipa::path(
    delete,
    path = "/club/{id}/posts/{post}",
    params(
        ("id" = String, Path, description = "Club id"),
        ("post" = String, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not this club's admin", body = Error),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["club"],
    operation_id = "moderatePost"
)]
#[delete("/club/{id}/posts/{post}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (club, post) = club_post_ids(&path)?;
    state.feed.post_in_club(&club, &post).await?;
    state.feed.delete_post(&requester, &post).await?;
    Ok(HttpResponse::NoContent().finish())
}
