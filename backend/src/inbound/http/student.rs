//! Student area: feed, own applications and clubs, notifications and own
//! posts. The role gate admits students only.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ClubApplication, ClubId, Error, MyClubs, Notification, NotificationFilter, NotificationId,
    Post, PostId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::browse::LimitQuery;
use crate::inbound::http::identity::Requester;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, ImagePayload, decode_image, parse_id};

/// Notification listing filter.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NotificationQuery {
    /// `all` (default) or `unread`.
    pub filter: Option<NotificationFilter>,
}

/// Notifications with the unread badge count.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsView {
    /// Number of unread notifications.
    pub unread: u64,
    /// Notifications, most recent first.
    pub items: Vec<Notification>,
}

/// Body for `POST /me/posts`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPostBody {
    /// Club to post in; the author must be a member.
    pub club_id: String,
    /// Post text, 1 to 5000 characters.
    pub text: String,
    /// Optional embedded image.
    pub image: Option<ImagePayload>,
}

/// Posts from followed and joined clubs.
#[utoipa::path(
    get,
    path = "/student/feed",
    params(LimitQuery),
    responses(
        (status = 200, description = "Feed, newest first", body = [Post]),
        (status = 401, description = "Sign in required", body = Error),
        (status = 403, description = "Students only", body = Error)
    ),
    tags = ["student"],
    operation_id = "feed"
)]
#[get("/student/feed")]
pub async fn feed(
    state: web::Data<HttpState>,
    requester: Requester,
    query: web::Query<LimitQuery>,
) -> ApiResult<web::Json<Vec<Post>>> {
    Ok(web::Json(state.feed.feed_for(&requester, query.limit).await?))
}

/// The caller's applications.
#[utoipa::path(
    get,
    path = "/student/applications",
    responses(
        (status = 200, description = "Applications", body = [ClubApplication]),
        (status = 403, description = "Students only", body = Error)
    ),
    tags = ["student"],
    operation_id = "myApplications"
)]
#[get("/student/applications")]
pub async fn my_applications(
    state: web::Data<HttpState>,
    requester: Requester,
) -> ApiResult<web::Json<Vec<ClubApplication>>> {
    Ok(web::Json(state.applications.list_mine(&requester).await?))
}

/// Clubs the caller follows or belongs to.
#[utoipa::path(
    get,
    path = "/student/clubs",
    responses(
        (status = 200, description = "Followed and joined clubs", body = MyClubs),
        (status = 403, description = "Students only", body = Error)
    ),
    tags = ["student"],
    operation_id = "myClubs"
)]
#[get("/student/clubs")]
pub async fn my_clubs(
    state: web::Data<HttpState>,
    requester: Requester,
) -> ApiResult<web::Json<MyClubs>> {
    Ok(web::Json(state.memberships.my_clubs(&requester).await?))
}

/// The caller's notifications.
#[utoipa::path(
    get,
    path = "/student/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = NotificationsView),
        (status = 403, description = "Students only", body = Error)
    ),
    tags = ["student"],
    operation_id = "notifications"
)]
#[get("/student/notifications")]
pub async fn notifications(
    state: web::Data<HttpState>,
    requester: Requester,
    query: web::Query<NotificationQuery>,
) -> ApiResult<web::Json<NotificationsView>> {
    let filter = query.filter.unwrap_or_default();
    let items = state.notifications.list_for(&requester, filter).await?;
    let unread = state.notifications.unread_count(&requester).await?;
    Ok(web::Json(NotificationsView { unread, items }))
}

/// Mark one notification as read.
#[utoipa::path(
    post,
    path = "/student/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 403, description = "Not your notification", body = Error),
        (status = 404, description = "Unknown notification", body = Error)
    ),
    tags = ["student"],
    operation_id = "markNotificationRead"
)]
#[post("/student/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<web::Json<Notification>> {
    let id: NotificationId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.notifications.mark_read(&requester, &id).await?))
}

/// Posts the caller wrote.
#[utoipa::path(
    get,
    path = "/me/posts",
    responses(
        (status = 200, description = "Own posts", body = [Post]),
        (status = 403, description = "Students only", body = Error)
    ),
    tags = ["student"],
    operation_id = "myPosts"
)]
#[get("/me/posts")]
pub async fn my_posts(
    state: web::Data<HttpState>,
    requester: Requester,
) -> ApiResult<web::Json<Vec<Post>>> {
    Ok(web::Json(state.feed.my_posts(&requester).await?))
}

/// Publish a post in a club the caller belongs to.
#[utoipa::path(
    post,
    path = "/me/posts",
    request_body = NewPostBody,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid post or not a member", body = Error),
        (status = 404, description = "Unknown club", body = Error),
        (status = 413, description = "Image too large", body = Error)
    ),
    tags = ["student"],
    operation_id = "createPost"
)]
#[post("/me/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    requester: Requester,
    payload: web::Json<NewPostBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let club: ClubId = parse_id(&body.club_id, FieldName::new("clubId"))?;
    let image = body
        .image
        .as_ref()
        .map(|image| decode_image(image, state.max_upload_bytes))
        .transpose()?;
    let post = state
        .feed
        .create_post(&requester, &club, &body.text, image)
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Delete one of the caller's posts.
#[utoipa::path(
    delete,
    path = "/me/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not your post", body = Error),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["student"],
    operation_id = "deleteMyPost"
)]
#[delete("/me/posts/{id}")]
pub async fn delete_my_post(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post: PostId = parse_id(&path, FieldName::new("id"))?;
    state.feed.delete_post(&requester, &post).await?;
    Ok(HttpResponse::NoContent().finish())
}
