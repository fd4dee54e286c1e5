//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    club_applications, club_members, clubs, follows, notifications, post_comments, post_likes,
    posts, universities, users,
};

// ---------------------------------------------------------------------------
// Universities and users
// ---------------------------------------------------------------------------

/// Row struct for the universities table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = universities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UniversityRow {
    pub id: Uuid,
    pub name: String,
    pub country_code: String,
}

/// Insertable struct for new universities.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = universities)]
pub(crate) struct NewUniversityRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub country_code: &'a str,
}

/// Row struct for the users table, including the password digest.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub university_id: Option<Uuid>,
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub university_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Clubs, follows and memberships
// ---------------------------------------------------------------------------

/// Row struct for the clubs table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clubs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClubRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub university_id: Uuid,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new clubs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clubs)]
pub(crate) struct NewClubRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub university_id: Uuid,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for follows. `created_at` uses the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub user_id: Uuid,
    pub club_id: Uuid,
}

/// Row struct for the club_members table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = club_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClubMemberRow {
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Applications and notifications
// ---------------------------------------------------------------------------

/// Row struct for the club_applications table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = club_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClubApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Changeset applied by the pending-to-resolved compare-and-set.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = club_applications)]
pub(crate) struct ApplicationResolutionUpdate<'a> {
    pub status: &'a str,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Row struct for the notifications table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub application_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Posts, comments and likes
// ---------------------------------------------------------------------------

/// Row struct for the posts table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the post_comments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = post_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for likes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_likes)]
pub(crate) struct NewLikeRow {
    pub post_id: Uuid,
    pub user_id: Uuid,
}
