//! PostgreSQL-backed `ClubRepository` and `MembershipRepository`.
//!
//! Club creation inserts the admin account and the club in one transaction.
//! Club deletion removes the club row, letting the `ON DELETE` clauses of the
//! schema cascade to dependants, then removes the admin account in the same
//! transaction.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    ClubCounts, ClubRepository, ClubRepositoryError, MembershipRepository,
    MembershipRepositoryError,
};
use crate::domain::{Club, ClubId, ClubMember, UniversityId, UserAccount, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_constraint,
};
use super::diesel_user_repository::{is_duplicate_email, new_user_row};
use super::models::{ClubMemberRow, ClubRow, NewClubRow, NewFollowRow};
use super::pool::{DbPool, PoolError};
use super::schema::{club_members, clubs, follows, users};

const UNIVERSITY_CONSTRAINTS: [&str; 2] = ["clubs_university_id_fkey", "users_university_id_fkey"];

/// Diesel-backed implementation of the club repository port.
#[derive(Clone)]
pub struct DieselClubRepository {
    pool: DbPool,
}

impl DieselClubRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ClubRepositoryError {
    map_basic_pool_error(error, ClubRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ClubRepositoryError {
    map_basic_diesel_error(
        error,
        ClubRepositoryError::query,
        ClubRepositoryError::connection,
    )
}

fn map_create_error(
    error: diesel::result::Error,
    club: &Club,
    admin: &UserAccount,
) -> ClubRepositoryError {
    if is_duplicate_email(&error) {
        return ClubRepositoryError::duplicate_admin_email(admin.user.email.to_string());
    }
    if violated_constraint(&error).is_some_and(|name| UNIVERSITY_CONSTRAINTS.contains(&name)) {
        return ClubRepositoryError::unknown_university(club.university.to_string());
    }
    map_diesel_error(error)
}

fn row_to_club(row: ClubRow) -> Club {
    Club {
        id: ClubId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        university: UniversityId::from_uuid(row.university_id),
        admin: UserId::from_uuid(row.admin_id),
        created_at: row.created_at,
    }
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

#[async_trait]
impl ClubRepository for DieselClubRepository {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = clubs::table
            .find(*id.as_uuid())
            .select(ClubRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_club))
    }

    async fn list(
        &self,
        university: Option<UniversityId>,
    ) -> Result<Vec<Club>, ClubRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = clubs::table
            .select(ClubRow::as_select())
            .order((clubs::name.asc(), clubs::id.asc()))
            .into_boxed();
        if let Some(university) = university {
            query = query.filter(clubs::university_id.eq(*university.as_uuid()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_club).collect())
    }

    async fn find_by_admin(&self, admin: &UserId) -> Result<Option<Club>, ClubRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = clubs::table
            .filter(clubs::admin_id.eq(*admin.as_uuid()))
            .select(ClubRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_club))
    }

    async fn create_with_admin(
        &self,
        club: &Club,
        admin: &UserAccount,
    ) -> Result<(), ClubRepositoryError> {
        let admin_row = new_user_row(admin);
        let club_row = NewClubRow {
            id: *club.id.as_uuid(),
            name: &club.name,
            description: &club.description,
            university_id: *club.university.as_uuid(),
            admin_id: *club.admin.as_uuid(),
            created_at: club.created_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&admin_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(clubs::table)
                    .values(&club_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| map_create_error(error, club, admin))
    }

    async fn delete_cascading(&self, id: &ClubId) -> Result<bool, ClubRepositoryError> {
        let club_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let admin: Option<Uuid> = diesel::delete(clubs::table.find(club_id))
                    .returning(clubs::admin_id)
                    .get_result(conn)
                    .await
                    .optional()?;
                let Some(admin) = admin else {
                    return Ok(false);
                };
                // clubs.admin_id: the admin account never outlives its club.
                let removed = diesel::delete(users::table.find(admin))
                    .execute(conn)
                    .await?;
                debug!(%club_id, %admin, removed, "club and admin account deleted");
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn counts(&self, id: &ClubId) -> Result<ClubCounts, ClubRepositoryError> {
        let club_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let members: i64 = club_members::table
            .filter(club_members::club_id.eq(club_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let followers: i64 = follows::table
            .filter(follows::club_id.eq(club_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ClubCounts {
            members: to_count(members),
            followers: to_count(followers),
        })
    }
}

/// Diesel-backed implementation of the membership repository port.
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_membership_pool_error(error: PoolError) -> MembershipRepositoryError {
    map_basic_pool_error(error, MembershipRepositoryError::connection)
}

fn map_membership_diesel_error(error: diesel::result::Error) -> MembershipRepositoryError {
    map_basic_diesel_error(
        error,
        MembershipRepositoryError::query,
        MembershipRepositoryError::connection,
    )
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn follow(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                user_id: *user.as_uuid(),
                club_id: *club.as_uuid(),
            })
            .on_conflict((follows::user_id, follows::club_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_membership_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn unfollow(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let removed = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(*user.as_uuid()))
                .filter(follows::club_id.eq(*club.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_membership_diesel_error)?;
        Ok(removed > 0)
    }

    async fn is_follower(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        diesel::select(exists(
            follows::table
                .filter(follows::user_id.eq(*user.as_uuid()))
                .filter(follows::club_id.eq(*club.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_membership_diesel_error)
    }

    async fn is_member(
        &self,
        user: &UserId,
        club: &ClubId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        diesel::select(exists(
            club_members::table
                .filter(club_members::user_id.eq(*user.as_uuid()))
                .filter(club_members::club_id.eq(*club.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_membership_diesel_error)
    }

    async fn remove_member(
        &self,
        club: &ClubId,
        user: &UserId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let removed = diesel::delete(
            club_members::table
                .filter(club_members::club_id.eq(*club.as_uuid()))
                .filter(club_members::user_id.eq(*user.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_membership_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_members(
        &self,
        club: &ClubId,
    ) -> Result<Vec<ClubMember>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let rows = club_members::table
            .filter(club_members::club_id.eq(*club.as_uuid()))
            .select(ClubMemberRow::as_select())
            .order((club_members::joined_at.asc(), club_members::user_id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_membership_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| ClubMember {
                user: UserId::from_uuid(row.user_id),
                club: ClubId::from_uuid(row.club_id),
                joined_at: row.joined_at,
            })
            .collect())
    }

    async fn followed_clubs(
        &self,
        user: &UserId,
    ) -> Result<Vec<ClubId>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let ids: Vec<Uuid> = follows::table
            .filter(follows::user_id.eq(*user.as_uuid()))
            .select(follows::club_id)
            .load(&mut conn)
            .await
            .map_err(map_membership_diesel_error)?;
        Ok(ids.into_iter().map(ClubId::from_uuid).collect())
    }

    async fn joined_clubs(&self, user: &UserId) -> Result<Vec<ClubId>, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_membership_pool_error)?;
        let ids: Vec<Uuid> = club_members::table
            .filter(club_members::user_id.eq(*user.as_uuid()))
            .select(club_members::club_id)
            .load(&mut conn)
            .await
            .map_err(map_membership_diesel_error)?;
        Ok(ids.into_iter().map(ClubId::from_uuid).collect())
    }
}
