//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, media storage, credential hashing) describe
//! what the domain needs from infrastructure. Each exposes a strongly typed
//! error built with `define_port_error!` so adapters map their failures into
//! predictable variants. Driving ports are the use cases inbound adapters
//! call; they always fail with the domain [`Error`](crate::domain::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod application_repository;
mod application_workflow;
mod club_provisioning;
mod club_repository;
mod credential_hasher;
mod directory;
mod feed;
mod media_library;
mod media_storage;
mod membership_repository;
mod memberships;
mod notification_repository;
mod notifications;
mod post_repository;
mod university_repository;
mod user_repository;

pub use accounts::Accounts;
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
pub use application_workflow::ApplicationWorkflow;
pub use club_provisioning::ClubProvisioning;
#[cfg(test)]
pub use club_repository::MockClubRepository;
pub use club_repository::{ClubCounts, ClubRepository, ClubRepositoryError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use directory::{ClubPage, Directory};
pub use feed::Feed;
pub use media_library::{MediaLibrary, StoredImage};
#[cfg(test)]
pub use media_storage::MockMediaStorage;
pub use media_storage::{MediaStorage, MediaStorageError};
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
pub use membership_repository::{MembershipRepository, MembershipRepositoryError};
pub use memberships::Memberships;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notifications::MockNotifications;
pub use notifications::Notifications;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use university_repository::MockUniversityRepository;
pub use university_repository::{UniversityRepository, UniversityRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
