//! Sign-up, login and principal resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::repository_errors::{map_hash_error, map_university_error, map_user_error};
use crate::domain::ports::{Accounts, CredentialHasher, UniversityRepository, UserRepository};
use crate::domain::{
    Email, Error, LoginCredentials, Password, Principal, Role, SignupRequest, User, UserAccount,
    UserId,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Service implementing [`Accounts`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountService {
    /// Create the service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            users,
            universities,
            hasher,
        }
    }
}

#[async_trait]
impl Accounts for AccountService {
    async fn sign_up(&self, request: SignupRequest) -> Result<User, Error> {
        let university = self
            .universities
            .find_by_id(&request.university)
            .await
            .map_err(map_university_error)?
            .ok_or_else(|| {
                Error::not_found(format!("university {} not found", request.university))
            })?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                email: request.email,
                role: Role::Student,
                university: Some(university.id),
            },
            password_hash: self.hasher.hash(&request.password).map_err(map_hash_error)?,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id, university_id = %university.id, "student registered");
        Ok(account.user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(account) = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            debug!("login for unknown email");
            return Err(Error::unauthenticated(INVALID_CREDENTIALS));
        };
        let valid = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hash_error)?;
        if !valid {
            debug!(user_id = %account.user.id, "login with wrong password");
            return Err(Error::unauthenticated(INVALID_CREDENTIALS));
        }
        Ok(account.user)
    }

    async fn principal_for(&self, user: &UserId) -> Result<Option<Principal>, Error> {
        let stored = self.users.find_by_id(user).await.map_err(map_user_error)?;
        Ok(stored.as_ref().and_then(Principal::from_user))
    }

    async fn bootstrap_admin(&self, email: &Email, password: &Password) -> Result<User, Error> {
        if let Some(existing) = self
            .users
            .find_account_by_email(email)
            .await
            .map_err(map_user_error)?
        {
            let user = existing.user;
            if user.role == Role::UniversityAdmin && user.university.is_none() {
                return Ok(user);
            }
            return Err(Error::constraint_violation(format!(
                "{email} is already used by a {} account",
                user.role
            )));
        }
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                email: email.clone(),
                role: Role::UniversityAdmin,
                university: None,
            },
            password_hash: self.hasher.hash(password).map_err(map_hash_error)?,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id, "global university admin created");
        Ok(account.user)
    }
}
