//! PostgreSQL-backed `UserRepository` and `UniversityRepository`.
//!
//! Stored rows are revalidated through the domain constructors on the way
//! out; a row that no longer validates surfaces as a query error rather than
//! a half-built account.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    UniversityRepository, UniversityRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, PasswordHash, Role, University, UniversityId, User, UserAccount, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_constraint,
};
use super::models::{NewUniversityRow, NewUserRow, UniversityRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{universities, users};

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a stored row into a validated account.
pub(super) fn row_to_account(row: UserRow) -> Result<UserAccount, String> {
    let UserRow {
        id,
        email,
        password_hash,
        role,
        university_id,
    } = row;
    let email = Email::parse(&email).map_err(|err| format!("stored email for {id}: {err}"))?;
    let role = Role::from_storage(&role).ok_or_else(|| format!("unknown role {role} for {id}"))?;
    Ok(UserAccount {
        user: User {
            id: UserId::from_uuid(id),
            email,
            role,
            university: university_id.map(UniversityId::from_uuid),
        },
        password_hash: PasswordHash::new(password_hash),
    })
}

/// Build the insertable row for `account`.
pub(super) fn new_user_row(account: &UserAccount) -> NewUserRow<'_> {
    NewUserRow {
        id: *account.user.id.as_uuid(),
        email: account.user.email.as_ref(),
        password_hash: account.password_hash.as_ref(),
        role: account.user.role.as_str(),
        university_id: account.user.university.map(|id| *id.as_uuid()),
    }
}

/// Whether `error` reports a clash on the unique email column.
pub(super) fn is_duplicate_email(error: &diesel::result::Error) -> bool {
    violated_constraint(error) == Some(EMAIL_CONSTRAINT)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&new_user_row(account))
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_duplicate_email(&error) {
                    UserPersistenceError::duplicate_email(account.user.email.to_string())
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_account(row).map(|account| account.user))
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account)
            .transpose()
            .map_err(UserPersistenceError::query)
    }
}

/// Diesel-backed implementation of the university repository port.
#[derive(Clone)]
pub struct DieselUniversityRepository {
    pool: DbPool,
}

impl DieselUniversityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_university_pool_error(error: PoolError) -> UniversityRepositoryError {
    map_basic_pool_error(error, UniversityRepositoryError::connection)
}

fn map_university_diesel_error(error: diesel::result::Error) -> UniversityRepositoryError {
    map_basic_diesel_error(
        error,
        UniversityRepositoryError::query,
        UniversityRepositoryError::connection,
    )
}

fn row_to_university(row: UniversityRow) -> University {
    University {
        id: UniversityId::from_uuid(row.id),
        name: row.name,
        country_code: row.country_code,
    }
}

#[async_trait]
impl UniversityRepository for DieselUniversityRepository {
    async fn list(&self) -> Result<Vec<University>, UniversityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_university_pool_error)?;
        let rows = universities::table
            .select(UniversityRow::as_select())
            .order((universities::name.asc(), universities::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_university_diesel_error)?;
        Ok(rows.into_iter().map(row_to_university).collect())
    }

    async fn find_by_id(
        &self,
        id: &UniversityId,
    ) -> Result<Option<University>, UniversityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_university_pool_error)?;
        let row = universities::table
            .find(*id.as_uuid())
            .select(UniversityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_university_diesel_error)?;
        Ok(row.map(row_to_university))
    }

    async fn insert(&self, university: &University) -> Result<(), UniversityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_university_pool_error)?;
        diesel::insert_into(universities::table)
            .values(&NewUniversityRow {
                id: *university.id.as_uuid(),
                name: &university.name,
                country_code: &university.country_code,
            })
            .execute(&mut conn)
            .await
            .map_err(map_university_diesel_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(email: &str, role: &str, university_id: Option<Uuid>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: "digest".to_owned(),
            role: role.to_owned(),
            university_id,
        }
    }

    #[rstest]
    fn valid_rows_become_accounts() {
        let university = Uuid::new_v4();

        let account = row_to_account(row("ada@uni.example", "club_admin", Some(university)))
            .expect("valid row");

        assert_eq!(account.user.role, Role::ClubAdmin);
        assert_eq!(account.user.university, Some(UniversityId::from_uuid(university)));
        assert_eq!(account.password_hash.as_ref(), "digest");
    }

    #[rstest]
    #[case("not-an-email", "student")]
    #[case("ada@uni.example", "superuser")]
    fn invalid_rows_are_reported(#[case] email: &str, #[case] role: &str) {
        assert!(row_to_account(row(email, role, None)).is_err());
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(error, UserPersistenceError::Connection { .. }));
        assert!(error.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_rows_map_to_query_errors() {
        let error = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
