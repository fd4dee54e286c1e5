//! Driving port for sign-up, login and principal resolution.
//!
//! Inbound adapters call it to authenticate credentials and to rebuild the
//! request principal from the identity stored in the session.

use async_trait::async_trait;

use crate::domain::{
    Email, Error, LoginCredentials, Password, Principal, SignupRequest, User, UserId,
};

/// Account use cases.
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a student account.
    async fn sign_up(&self, request: SignupRequest) -> Result<User, Error>;

    /// Verify credentials and return the signed-in user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Principal for a session identity. `None` once the account is gone.
    async fn principal_for(&self, user: &UserId) -> Result<Option<Principal>, Error>;

    /// Ensure a global university admin with `email` exists.
    async fn bootstrap_admin(&self, email: &Email, password: &Password) -> Result<User, Error>;
}
