//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers every HTTP endpoint from the
//! inbound layer, the domain payload schemas, and the session cookie
//! security scheme.
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::domain::ports::ClubPage;
use crate::domain::{
    ApplicationStatus, Club, ClubApplication, ClubMember, ClubRelationship, Comment, Error,
    ErrorCode, MyClubs, Notification, Post, Role, University, User,
};
use crate::inbound::http::auth::{CsrfToken, LoginRequest, SignupBody};
use crate::inbound::http::browse::{ClubPageView, LandingView, Viewer};
use crate::inbound::http::social::{CommentBody, LikeCount};
use crate::inbound::http::student::{NewPostBody, NotificationsView};
use crate::inbound::http::university::{NewClubBody, NewUniversityBody};
use crate::inbound::http::validation::ImagePayload;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login or POST /signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus clubs API",
        description = "Clubs, membership applications and club feeds for university students."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::csrf_token,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::browse::landing,
        crate::inbound::http::browse::explore,
        crate::inbound::http::browse::universities,
        crate::inbound::http::browse::club_page,
        crate::inbound::http::browse::club_posts,
        crate::inbound::http::browse::list_comments,
        crate::inbound::http::social::follow,
        crate::inbound::http::social::unfollow,
        crate::inbound::http::social::apply,
        crate::inbound::http::social::cancel_application,
        crate::inbound::http::social::add_comment,
        crate::inbound::http::social::like,
        crate::inbound::http::social::unlike,
        crate::inbound::http::student::feed,
        crate::inbound::http::student::my_applications,
        crate::inbound::http::student::my_clubs,
        crate::inbound::http::student::notifications,
        crate::inbound::http::student::mark_read,
        crate::inbound::http::student::my_posts,
        crate::inbound::http::student::create_post,
        crate::inbound::http::student::delete_my_post,
        crate::inbound::http::club_admin::club_applications,
        crate::inbound::http::club_admin::accept,
        crate::inbound::http::club_admin::reject,
        crate::inbound::http::club_admin::members,
        crate::inbound::http::club_admin::remove_member,
        crate::inbound::http::club_admin::delete_post,
        crate::inbound::http::university::managed_clubs,
        crate::inbound::http::university::create_club,
        crate::inbound::http::university::delete_club,
        crate::inbound::http::university::create_university,
        crate::inbound::http::uploads::get_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        University,
        Club,
        ClubPage,
        ClubMember,
        ClubRelationship,
        MyClubs,
        ClubApplication,
        ApplicationStatus,
        Notification,
        Post,
        Comment,
        LoginRequest,
        SignupBody,
        CsrfToken,
        Viewer,
        LandingView,
        ClubPageView,
        CommentBody,
        LikeCount,
        NotificationsView,
        NewPostBody,
        ImagePayload,
        NewClubBody,
        NewUniversityBody,
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in and anti-forgery tokens"),
        (name = "browse", description = "Public club listings and pages"),
        (name = "social", description = "Following, applying, comments and likes"),
        (name = "student", description = "Student feed, applications and notifications"),
        (name = "club", description = "Club administration"),
        (name = "university", description = "University administration"),
        (name = "uploads", description = "Stored post images"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
