//! Builders for the repository set and the shared HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use campus_clubs::domain::ports::{Accounts, CredentialHasher, MediaStorage, MediaStorageError};
use campus_clubs::domain::{
    CredentialsValidationError, Email, EmailValidationError, Error, Password, User,
};
use campus_clubs::inbound::http::health::StorageBackend;
use campus_clubs::inbound::http::state::{HttpState, Repositories};
use campus_clubs::outbound::credentials::Argon2CredentialHasher;
use campus_clubs::outbound::media::DirectoryMediaStorage;
use campus_clubs::outbound::memory::MemoryStore;
use campus_clubs::outbound::persistence::{
    DbPool, DieselApplicationRepository, DieselClubRepository, DieselMembershipRepository,
    DieselNotificationRepository, DieselPostRepository, DieselUniversityRepository,
    DieselUserRepository,
};

use super::ServerConfig;

/// Errors raised while preparing application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The upload directory could not be opened.
    #[error("failed to open uploads directory: {0}")]
    Media(#[from] MediaStorageError),
    /// The bootstrap admin email is malformed.
    #[error("invalid bootstrap admin email: {0}")]
    BootstrapEmail(#[from] EmailValidationError),
    /// The bootstrap admin password is unacceptable.
    #[error("invalid bootstrap admin password: {0}")]
    BootstrapPassword(#[from] CredentialsValidationError),
    /// The bootstrap admin could not be stored.
    #[error("failed to bootstrap admin: {0}")]
    Bootstrap(Error),
}

/// Storage backend the configuration selects.
pub fn storage_backend(config: &ServerConfig) -> StorageBackend {
    if config.db_pool.is_some() {
        StorageBackend::Postgres
    } else {
        StorageBackend::Memory
    }
}

/// Build the repository set: Diesel adapters when a pool is configured, the
/// in-memory store otherwise. Media always lives on disk.
pub(super) fn build_repositories(config: &ServerConfig) -> Result<Repositories, StateError> {
    let media: Arc<dyn MediaStorage> = Arc::new(DirectoryMediaStorage::open(&config.uploads_dir)?);
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repositories = match &config.db_pool {
        Some(pool) => Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            universities: Arc::new(DieselUniversityRepository::new(pool.clone())),
            clubs: Arc::new(DieselClubRepository::new(pool.clone())),
            memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
            applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            posts: Arc::new(DieselPostRepository::new(pool.clone())),
            media,
            hasher,
            clock,
        },
        None => {
            let store = Arc::new(MemoryStore::new());
            Repositories {
                users: store.clone(),
                universities: store.clone(),
                clubs: store.clone(),
                memberships: store.clone(),
                applications: store.clone(),
                notifications: store.clone(),
                posts: store,
                media,
                hasher,
                clock,
            }
        }
    };
    Ok(repositories)
}

/// Build the shared HTTP state.
pub(super) fn build_http_state(config: &ServerConfig) -> Result<web::Data<HttpState>, StateError> {
    let repositories = build_repositories(config)?;
    Ok(web::Data::new(HttpState::from_repositories(
        repositories,
        config.limits,
    )))
}

/// Ensure the configured global university admin exists.
pub(super) async fn bootstrap_admin(
    accounts: &dyn Accounts,
    email: &str,
    password: &str,
) -> Result<User, StateError> {
    let email = Email::parse(email)?;
    let password = Password::new_secret(password)?;
    let admin = accounts
        .bootstrap_admin(&email, &password)
        .await
        .map_err(StateError::Bootstrap)?;
    info!(user_id = %admin.id, "bootstrap admin ready");
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use campus_clubs::domain::Role;
    use rstest::rstest;

    fn config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("addr"),
        )
        .with_uploads_dir(dir)
    }

    #[rstest]
    fn missing_pool_selects_memory_storage() {
        let dir = tempfile::tempdir().expect("tempdir");

        assert_eq!(storage_backend(&config(dir.path())), StorageBackend::Memory);
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_http_state(&config(dir.path())).expect("state");

        let first = bootstrap_admin(state.accounts.as_ref(), "root@campus.example", "s3cret-pass")
            .await
            .expect("first bootstrap");
        let second = bootstrap_admin(state.accounts.as_ref(), "root@campus.example", "s3cret-pass")
            .await
            .expect("second bootstrap");

        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::UniversityAdmin);
        assert_eq!(first.university, None);
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_rejects_short_passwords() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_http_state(&config(dir.path())).expect("state");

        let result = bootstrap_admin(state.accounts.as_ref(), "root@campus.example", "short").await;

        assert!(matches!(result, Err(StateError::BootstrapPassword(_))));
    }
}
