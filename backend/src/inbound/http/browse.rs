//! Public browsing: landing page, explore listing and club pages.
//!
//! None of these routes need a session, but a signed-in caller sees how they
//! relate to the club they are looking at.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::ClubPage;
use crate::domain::{
    Club, ClubId, ClubRelationship, Comment, Error, LOGIN_PATH, Post, PostId, Role, University,
    UniversityId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Requester;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Who is looking at the page.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    /// Account id.
    pub id: UserId,
    /// Account role.
    pub role: Role,
}

/// Landing view model.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    /// The signed-in user, if any.
    pub viewer: Option<Viewer>,
    /// Where anonymous users sign in.
    pub login_url: String,
    /// Universities with clubs to explore.
    pub universities: Vec<University>,
}

/// Club page plus the caller's relationship with the club.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubPageView {
    /// Public club page.
    #[serde(flatten)]
    pub page: ClubPage,
    /// How the caller relates to the club; all false when signed out.
    pub relationship: ClubRelationship,
}

/// Optional explore filter.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ExploreQuery {
    /// Restrict the listing to one university.
    pub university: Option<String>,
}

/// Optional page size.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LimitQuery {
    /// Number of posts, clamped to 1..=200.
    pub limit: Option<usize>,
}

/// Landing page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing view", body = LandingView)),
    tags = ["browse"],
    operation_id = "landing",
    security([])
)]
#[get("/")]
pub async fn landing(
    state: web::Data<HttpState>,
    requester: Requester,
) -> ApiResult<web::Json<LandingView>> {
    let listed = state.directory.universities().await?;
    let viewer = requester.principal().map(|principal| Viewer {
        id: principal.user_id(),
        role: principal.role(),
    });
    Ok(web::Json(LandingView {
        viewer,
        login_url: LOGIN_PATH.to_owned(),
        universities: listed,
    }))
}

/// List clubs, optionally for one university.
#[utoipa::path(
    get,
    path = "/explore",
    params(ExploreQuery),
    responses(
        (status = 200, description = "Clubs", body = [Club]),
        (status = 400, description = "Invalid university id", body = Error)
    ),
    tags = ["browse"],
    operation_id = "explore",
    security([])
)]
#[get("/explore")]
pub async fn explore(
    state: web::Data<HttpState>,
    query: web::Query<ExploreQuery>,
) -> ApiResult<web::Json<Vec<Club>>> {
    let university = query
        .university
        .as_deref()
        .map(|raw| parse_id::<UniversityId>(raw, FieldName::new("university")))
        .transpose()?;
    Ok(web::Json(state.directory.explore(university).await?))
}

/// List universities.
#[utoipa::path(
    get,
    path = "/explore/universities",
    responses((status = 200, description = "Universities", body = [University])),
    tags = ["browse"],
    operation_id = "listUniversities",
    security([])
)]
#[get("/explore/universities")]
pub async fn universities(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<University>>> {
    Ok(web::Json(state.directory.universities().await?))
}

/// Public page of one club.
#[utoipa::path(
    get,
    path = "/clubs/{id}",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Club page", body = ClubPageView),
        (status = 400, description = "Invalid club id", body = Error),
        (status = 404, description = "Unknown club", body = Error)
    ),
    tags = ["browse"],
    operation_id = "clubPage",
    security([])
)]
#[get("/clubs/{id}")]
pub async fn club_page(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClubPageView>> {
    let club: ClubId = parse_id(&path, FieldName::new("id"))?;
    let page = state.directory.club_page(&club).await?;
    let relationship = state.memberships.relationship(&requester, &club).await?;
    Ok(web::Json(ClubPageView { page, relationship }))
}

/// Posts of one club, newest first.
#[utoipa::path(
    get,
    path = "/clubs/{id}/posts",
    params(("id" = String, Path, description = "Club id"), LimitQuery),
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 404, description = "Unknown club", body = Error)
    ),
    tags = ["browse"],
    operation_id = "clubPosts",
    security([])
)]
#[get("/clubs/{id}/posts")]
pub async fn club_posts(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> ApiResult<web::Json<Vec<Post>>> {
    let club: ClubId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.feed.club_posts(&club, query.limit).await?))
}

/// Comments on a post, oldest first.
#[utoipa::path(
    get,
    path = "/clubs/{id}/posts/{post}/comments",
    params(
        ("id" = String, Path, description = "Club id"),
        ("post" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Unknown club or post", body = Error)
    ),
    tags = ["browse"],
    operation_id = "listComments",
    security([])
)]
#[get("/clubs/{id}/posts/{post}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let (club, post) = club_post_ids(&path)?;
    state.feed.post_in_club(&club, &post).await?;
    Ok(web::Json(state.feed.comments(&post).await?))
}

pub(crate) fn club_post_ids(path: &(String, String)) -> Result<(ClubId, PostId), Error> {
    let (club, post) = path;
    Ok((
        parse_id(club, FieldName::new("id"))?,
        parse_id(post, FieldName::new("post"))?,
    ))
}
