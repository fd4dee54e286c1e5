//! Port for password hashing.
use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing or verifying passwords.
    pub enum CredentialHashError {
        /// The stored hash could not be decoded.
        Malformed { message: String } => "stored password hash is malformed: {message}",
        /// A new hash could not be computed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a password with a fresh salt.
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError>;

    /// Check a password against a stored hash.
    fn verify(&self, password: &Password, hash: &PasswordHash)
    -> Result<bool, CredentialHashError>;
}
