//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    Accounts, ApplicationRepository, ApplicationWorkflow, ClubProvisioning, ClubRepository,
    CredentialHasher, Directory, Feed, MediaLibrary, MediaStorage, MembershipRepository,
    Memberships, NotificationRepository, Notifications, PostRepository, UniversityRepository,
    UserRepository,
};
use crate::domain::{
    AccountService, ApplicationWorkflowService, ClubProvisioningService, DEFAULT_FEED_LIMIT,
    DEFAULT_MAX_UPLOAD_BYTES, DirectoryService, FeedService, MediaLibraryService,
    MembershipService, NotificationService,
};

/// Driven adapters the domain services are built from.
#[derive(Clone)]
pub struct Repositories {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Universities.
    pub universities: Arc<dyn UniversityRepository>,
    /// Clubs.
    pub clubs: Arc<dyn ClubRepository>,
    /// Follows and memberships.
    pub memberships: Arc<dyn MembershipRepository>,
    /// Club applications.
    pub applications: Arc<dyn ApplicationRepository>,
    /// Notifications.
    pub notifications: Arc<dyn NotificationRepository>,
    /// Posts, comments and likes.
    pub posts: Arc<dyn PostRepository>,
    /// Uploaded images.
    pub media: Arc<dyn MediaStorage>,
    /// Password hashing.
    pub hasher: Arc<dyn CredentialHasher>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Tunables applied while wiring services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Default number of posts in a feed page.
    pub feed_limit: usize,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: u64,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            feed_limit: DEFAULT_FEED_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Sign-up, login and principal lookup.
    pub accounts: Arc<dyn Accounts>,
    /// Club application lifecycle.
    pub applications: Arc<dyn ApplicationWorkflow>,
    /// Club and university administration.
    pub provisioning: Arc<dyn ClubProvisioning>,
    /// Public browsing.
    pub directory: Arc<dyn Directory>,
    /// Posts, comments and likes.
    pub feed: Arc<dyn Feed>,
    /// Uploaded images.
    pub media: Arc<dyn MediaLibrary>,
    /// Follows and memberships.
    pub memberships: Arc<dyn Memberships>,
    /// Per-user notifications.
    pub notifications: Arc<dyn Notifications>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-up, login and principal lookup.
    pub accounts: Arc<dyn Accounts>,
    /// Club application lifecycle.
    pub applications: Arc<dyn ApplicationWorkflow>,
    /// Club and university administration.
    pub provisioning: Arc<dyn ClubProvisioning>,
    /// Public browsing.
    pub directory: Arc<dyn Directory>,
    /// Posts, comments and likes.
    pub feed: Arc<dyn Feed>,
    /// Uploaded images.
    pub media: Arc<dyn MediaLibrary>,
    /// Follows and memberships.
    pub memberships: Arc<dyn Memberships>,
    /// Per-user notifications.
    pub notifications: Arc<dyn Notifications>,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: u64,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire every domain service over `repos`.
    pub fn from_repositories(repos: Repositories, limits: ServiceLimits) -> Self {
        let Repositories {
            users,
            universities,
            clubs,
            memberships,
            applications,
            notifications,
            posts,
            media,
            hasher,
            clock,
        } = repos;
        let notification_service: Arc<dyn Notifications> =
            Arc::new(NotificationService::new(notifications, Arc::clone(&clock)));
        let ports = HttpStatePorts {
            accounts: Arc::new(AccountService::new(
                users,
                Arc::clone(&universities),
                Arc::clone(&hasher),
            )),
            applications: Arc::new(ApplicationWorkflowService::new(
                Arc::clone(&clubs),
                Arc::clone(&memberships),
                Arc::clone(&applications),
                Arc::clone(&notification_service),
                Arc::clone(&clock),
            )),
            provisioning: Arc::new(ClubProvisioningService::new(
                Arc::clone(&clubs),
                Arc::clone(&universities),
                Arc::clone(&posts),
                Arc::clone(&media),
                hasher,
                Arc::clone(&clock),
            )),
            directory: Arc::new(DirectoryService::new(
                universities,
                Arc::clone(&clubs),
                Arc::clone(&posts),
            )),
            feed: Arc::new(
                FeedService::new(
                    posts,
                    Arc::clone(&clubs),
                    Arc::clone(&memberships),
                    Arc::clone(&media),
                    clock,
                )
                .with_default_limit(limits.feed_limit),
            ),
            media: Arc::new(MediaLibraryService::new(media)),
            memberships: Arc::new(MembershipService::new(clubs, memberships, applications)),
            notifications: notification_service,
        };
        Self::new(ports).with_max_upload_bytes(limits.max_upload_bytes)
    }

    /// Construct state with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            applications,
            provisioning,
            directory,
            feed,
            media,
            memberships,
            notifications,
        } = ports;
        Self {
            accounts,
            applications,
            provisioning,
            directory,
            feed,
            media,
            memberships,
            notifications,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload limit.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// JSON body limit matching [`HttpState::max_upload_bytes`].
    #[must_use]
    pub fn json_body_limit(&self) -> usize {
        json_body_limit(self.max_upload_bytes)
    }
}

/// Body limit for a base64 image of `max_upload_bytes` plus 64 KiB of slack
/// for the surrounding fields.
///
/// # Examples
/// ```
/// use campus_clubs::inbound::http::state::json_body_limit;
///
/// assert_eq!(json_body_limit(3), 4 + 64 * 1024);
/// ```
#[must_use]
pub fn json_body_limit(max_upload_bytes: u64) -> usize {
    const SLACK: u64 = 64 * 1024;
    let encoded = max_upload_bytes.div_ceil(3).saturating_mul(4);
    usize::try_from(encoded.saturating_add(SLACK)).unwrap_or(usize::MAX)
}
