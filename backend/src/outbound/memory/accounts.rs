//! User and university ports over the in-memory store.

use async_trait::async_trait;

use super::MemoryStore;
use crate::domain::ports::{
    UniversityRepository, UniversityRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Email, University, UniversityId, User, UserAccount, UserId};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        self.with_state(UserPersistenceError::query, |state| {
            if state.email_taken(account) {
                return Err(UserPersistenceError::duplicate_email(
                    account.user.email.to_string(),
                ));
            }
            state.users.insert(account.user.id, account.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.read(UserPersistenceError::query, |state| {
            state.users.get(id).map(|account| account.user.clone())
        })
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.read(UserPersistenceError::query, |state| {
            state
                .users
                .values()
                .find(|account| &account.user.email == email)
                .cloned()
        })
    }
}

#[async_trait]
impl UniversityRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<University>, UniversityRepositoryError> {
        self.read(UniversityRepositoryError::query, |state| {
            let mut universities: Vec<_> = state.universities.values().cloned().collect();
            universities.sort_by(|a, b| a.name.cmp(&b.name));
            universities
        })
    }

    async fn find_by_id(
        &self,
        id: &UniversityId,
    ) -> Result<Option<University>, UniversityRepositoryError> {
        self.read(UniversityRepositoryError::query, |state| {
            state.universities.get(id).cloned()
        })
    }

    async fn insert(&self, university: &University) -> Result<(), UniversityRepositoryError> {
        self.with_state(UniversityRepositoryError::query, |state| {
            state.universities.insert(university.id, university.clone());
            Ok(())
        })
    }
}
