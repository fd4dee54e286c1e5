//! Port for university persistence.
use async_trait::async_trait;

use crate::domain::{University, UniversityId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by university repository adapters.
    pub enum UniversityRepositoryError: store "university repository" {}
}

/// Storage for universities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniversityRepository: Send + Sync {
    /// Every university, ordered by name.
    async fn list(&self) -> Result<Vec<University>, UniversityRepositoryError>;

    /// Fetch a university by identifier.
    async fn find_by_id(
        &self,
        id: &UniversityId,
    ) -> Result<Option<University>, UniversityRepositoryError>;

    /// Insert a new university.
    async fn insert(&self, university: &University) -> Result<(), UniversityRepositoryError>;
}
