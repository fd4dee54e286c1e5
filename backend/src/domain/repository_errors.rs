//! Mapping from driven-port failures to domain errors.
//!
//! Connection failures become `service_unavailable` and query failures become
//! `internal_error`. Uniqueness failures map to the specific code the caller
//! can act on.

use serde_json::json;
use tracing::{error, warn};

use super::Error;
use super::ports::{
    ApplicationRepositoryError, ClubRepositoryError, CredentialHashError, MediaStorageError,
    MembershipRepositoryError, NotificationRepositoryError, PostRepositoryError,
    UniversityRepositoryError, UserPersistenceError,
};

fn unavailable(store: &str, message: String) -> Error {
    warn!(store, %message, "store unavailable");
    Error::service_unavailable(format!("{store} unavailable: {message}"))
}

fn failed(store: &str, message: String) -> Error {
    error!(store, %message, "store query failed");
    Error::internal(format!("{store} error: {message}"))
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            unavailable(UserPersistenceError::STORE, message)
        }
        UserPersistenceError::Query { message } => failed(UserPersistenceError::STORE, message),
        UserPersistenceError::DuplicateEmail { email } => {
            Error::constraint_violation(format!("email {email} is already registered"))
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
    }
}

pub(crate) fn map_university_error(error: UniversityRepositoryError) -> Error {
    match error {
        UniversityRepositoryError::Connection { message } => {
            unavailable(UniversityRepositoryError::STORE, message)
        }
        UniversityRepositoryError::Query { message } => {
            failed(UniversityRepositoryError::STORE, message)
        }
    }
}

pub(crate) fn map_club_error(error: ClubRepositoryError) -> Error {
    match error {
        ClubRepositoryError::Connection { message } => {
            unavailable(ClubRepositoryError::STORE, message)
        }
        ClubRepositoryError::Query { message } => failed(ClubRepositoryError::STORE, message),
        ClubRepositoryError::DuplicateAdminEmail { email } => {
            Error::constraint_violation(format!("email {email} is already registered"))
                .with_details(json!({ "field": "adminEmail", "code": "duplicate_email" }))
        }
        ClubRepositoryError::UnknownUniversity { university } => {
            Error::not_found(format!("university {university} not found"))
        }
    }
}

pub(crate) fn map_membership_error(error: MembershipRepositoryError) -> Error {
    match error {
        MembershipRepositoryError::Connection { message } => {
            unavailable(MembershipRepositoryError::STORE, message)
        }
        MembershipRepositoryError::Query { message } => {
            failed(MembershipRepositoryError::STORE, message)
        }
    }
}

pub(crate) fn map_application_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            unavailable(ApplicationRepositoryError::STORE, message)
        }
        ApplicationRepositoryError::Query { message } => {
            failed(ApplicationRepositoryError::STORE, message)
        }
        ApplicationRepositoryError::DuplicatePending { club } => {
            Error::duplicate_pending_application(format!(
                "you already have a pending application to club {club}"
            ))
        }
    }
}

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            unavailable(NotificationRepositoryError::STORE, message)
        }
        NotificationRepositoryError::Query { message } => {
            failed(NotificationRepositoryError::STORE, message)
        }
    }
}

pub(crate) fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            unavailable(PostRepositoryError::STORE, message)
        }
        PostRepositoryError::Query { message } => failed(PostRepositoryError::STORE, message),
    }
}

pub(crate) fn map_media_error(error: MediaStorageError) -> Error {
    match error {
        MediaStorageError::Io { message } => failed("media storage", message),
    }
}

pub(crate) fn map_hash_error(error: CredentialHashError) -> Error {
    match error {
        CredentialHashError::Malformed { message } | CredentialHashError::Hashing { message } => {
            failed("credential store", message)
        }
    }
}
