//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use mockable::DefaultClock;
use tempfile::TempDir;

use crate::domain::ports::UniversityRepository;
use crate::domain::{Email, Password, SignupRequest, University, UserId};
use crate::inbound::http::state::{HttpState, Repositories, ServiceLimits};
use crate::outbound::credentials::Argon2CredentialHasher;
use crate::outbound::media::DirectoryMediaStorage;
use crate::outbound::memory::MemoryStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// HTTP state over a fresh in-memory store.
pub struct TestContext {
    pub state: web::Data<HttpState>,
    pub store: MemoryStore,
    pub media: Arc<DirectoryMediaStorage>,
    _uploads: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("uploads dir");
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let media = Arc::new(DirectoryMediaStorage::open(uploads.path()).expect("media storage"));
        let repos = Repositories {
            users: shared.clone(),
            universities: shared.clone(),
            clubs: shared.clone(),
            memberships: shared.clone(),
            applications: shared.clone(),
            notifications: shared.clone(),
            posts: shared,
            media: media.clone(),
            hasher: Arc::new(Argon2CredentialHasher::with_cost(64, 1).expect("argon2 params")),
            clock: Arc::new(DefaultClock),
        };
        Self {
            state: web::Data::new(HttpState::from_repositories(repos, ServiceLimits::default())),
            store,
            media,
            _uploads: uploads,
        }
    }

    /// Register a university directly in the store.
    pub async fn university(&self, name: &str) -> University {
        let university = University::try_new(name, "GB").expect("valid university");
        UniversityRepository::insert(&self.store, &university)
            .await
            .expect("insert university");
        university
    }

    /// Sign up a student at a new university.
    pub async fn student(&self, email: &str) -> UserId {
        let university = self.university("Test University").await;
        let request = SignupRequest::try_from_parts(email, "correct horse", university.id)
            .expect("valid signup");
        self.state
            .accounts
            .sign_up(request)
            .await
            .expect("sign up")
            .id
    }

    /// Ensure the global university admin exists.
    pub async fn global_admin(&self) -> UserId {
        let email = Email::parse("root@campus.example").expect("valid email");
        let password = Password::new_secret("bootstrap-secret").expect("valid password");
        self.state
            .accounts
            .bootstrap_admin(&email, &password)
            .await
            .expect("bootstrap admin")
            .id
    }
}
