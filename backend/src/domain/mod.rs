//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities, the authorization gate and the
//! services behind every driving port. Nothing here depends on actix or
//! diesel; adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifier.
//! - AuthorizationGate, RequestContext, Principal: who may do what.
//! - Club, ClubApplication, Notification, Post: the aggregates.
//! - `*Service`: implementations of the driving ports.

pub mod application;
pub mod auth;
pub mod authorization;
pub mod cascade;
pub mod club;
pub mod error;
pub mod ids;
pub mod media;
pub mod notification;
pub mod ports;
pub mod post;
pub mod trace_id;
pub mod university;
pub mod user;

mod account_service;
mod application_workflow_service;
mod club_provisioning_service;
mod directory_service;
mod feed_service;
mod media_library_service;
mod membership_service;
mod notification_service;
mod repository_errors;

pub use self::account_service::AccountService;
pub use self::application::{
    ApplicationFilter, ApplicationStatus, ClubApplication, Resolution, ResolveOutcome,
    resolution_message,
};
pub use self::application_workflow_service::ApplicationWorkflowService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN, Password, SignupRequest,
};
pub use self::authorization::{
    Action, AuthorizationGate, Decision, DenyReason, Principal, RequestContext, RouteScope,
    SocialAction, UniversityScope,
};
pub use self::cascade::{
    CLUB_DELETION_CASCADE, CascadeAction, CascadeRule, USER_DELETION_CASCADE,
};
pub use self::club::{
    Club, ClubDetails, ClubMember, ClubRelationship, ClubValidationError, MyClubs,
    NewClubRequest,
};
pub use self::club_provisioning_service::ClubProvisioningService;
pub use self::directory_service::DirectoryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, LOGIN_PATH, TRACE_ID_HEADER};
pub use self::feed_service::FeedService;
pub use self::ids::{
    ApplicationId, ClubId, CommentId, InvalidId, NotificationId, PostId, UniversityId, UserId,
};
pub use self::media::{
    DEFAULT_MAX_UPLOAD_BYTES, ImageKind, ImageUpload, ImageUploadError, MediaName, MediaUrl,
    UPLOADS_PREFIX,
};
pub use self::media_library_service::MediaLibraryService;
pub use self::membership_service::MembershipService;
pub use self::notification::{Notification, NotificationFilter, sort_most_recent_first};
pub use self::notification_service::NotificationService;
pub use self::post::{
    COMMENT_TEXT_MAX, Comment, DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT, POST_TEXT_MAX, Post, PostText,
    TextValidationError, clamp_feed_limit, sort_newest_first,
};
pub use self::trace_id::TraceId;
pub use self::university::{University, UniversityValidationError};
pub use self::user::{Email, EmailValidationError, PasswordHash, Role, User, UserAccount};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use campus_clubs::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such club"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
