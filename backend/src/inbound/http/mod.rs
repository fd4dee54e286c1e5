//! HTTP inbound adapter exposing REST endpoints.
//!
//! Route prefixes map onto the authorization table enforced by
//! [`RoleGate`](crate::middleware::RoleGate):
//!
//! ```text
//! /, /explore, /clubs, /login, /signup, /csrf, /uploads, /health  public
//! /student, /me/posts                                             students
//! /club                                                           club admins
//! /university                                                     university admins
//! ```

pub mod auth;
pub mod browse;
pub mod cache_control;
pub mod club_admin;
pub mod error;
pub mod health;
pub mod identity;
pub mod session;
pub mod session_config;
pub mod social;
pub mod state;
pub mod student;
#[cfg(test)]
pub mod test_utils;
pub mod university;
pub mod uploads;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use self::error::{json_error_handler, path_error_handler, query_error_handler};

/// Register every REST endpoint except the health checks.
///
/// Extractor configuration comes from [`extractor_configs`]; callers supply
/// the [`HttpState`](state::HttpState) as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::csrf_token)
        .service(auth::signup)
        .service(auth::login)
        .service(auth::logout)
        .service(browse::landing)
        .service(browse::universities)
        .service(browse::explore)
        .service(browse::club_page)
        .service(browse::club_posts)
        .service(browse::list_comments)
        .service(social::follow)
        .service(social::unfollow)
        .service(social::apply)
        .service(social::cancel_application)
        .service(social::add_comment)
        .service(social::like)
        .service(social::unlike)
        .service(student::feed)
        .service(student::my_applications)
        .service(student::my_clubs)
        .service(student::notifications)
        .service(student::mark_read)
        .service(student::my_posts)
        .service(student::create_post)
        .service(student::delete_my_post)
        .service(club_admin::club_applications)
        .service(club_admin::accept)
        .service(club_admin::reject)
        .service(club_admin::members)
        .service(club_admin::remove_member)
        .service(club_admin::delete_post)
        .service(university::managed_clubs)
        .service(university::create_club)
        .service(university::delete_club)
        .service(university::create_university)
        .service(uploads::get_upload);
}

/// JSON, query and path extractor settings mapping failures to the domain
/// error envelope.
///
/// `json_limit` bounds JSON bodies; overflowing it yields
/// `payload_too_large`.
pub fn extractor_configs(
    json_limit: usize,
) -> (web::JsonConfig, web::QueryConfig, web::PathConfig) {
    (
        web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(json_error_handler),
        web::QueryConfig::default().error_handler(query_error_handler),
        web::PathConfig::default().error_handler(path_error_handler),
    )
}
