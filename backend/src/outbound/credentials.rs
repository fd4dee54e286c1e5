//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the cost parameters travel with each hash and can be raised without
//! invalidating existing accounts.

use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::domain::ports::{CredentialHashError, CredentialHasher};
use crate::domain::{Password, PasswordHash};

const SALT_LEN: usize = 16;

/// `CredentialHasher` producing Argon2id PHC strings.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Hasher with explicit memory (KiB) and time costs and one lane.
    ///
    /// # Errors
    /// Returns [`CredentialHashError::Hashing`] when Argon2 rejects the costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, CredentialHashError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError> {
        let mut raw = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut raw);
        let salt = SaltString::encode_b64(&raw);
        raw.zeroize();
        let salt = salt.map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        let encoded = self
            .argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHashError> {
        let parsed = password_hash::PasswordHash::new(hash.as_ref())
            .map_err(|err| CredentialHashError::malformed(err.to_string()))?;
        // Costs come from the stored string, not from this hasher.
        match self
            .argon2()
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialHashError::malformed(err.to_string())),
        }
    }
}
