//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Universities clubs belong to.
    universities (id) {
        id -> Uuid,
        name -> Varchar,
        /// Upper-case ISO 3166-1 alpha-2 code.
        country_code -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User accounts. `email` is unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        /// Encoded digest produced by the credential hasher.
        password_hash -> Text,
        /// `student`, `club_admin` or `university_admin`.
        role -> Varchar,
        /// Null only for global university admins.
        university_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Clubs. `admin_id` is unique: one club per admin account.
    clubs (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        university_id -> Uuid,
        admin_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    follows (user_id, club_id) {
        user_id -> Uuid,
        club_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    club_members (club_id, user_id) {
        club_id -> Uuid,
        user_id -> Uuid,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Applications. At most one `pending` row per (user, club), enforced by
    /// the `club_applications_one_pending` partial unique index.
    club_applications (id) {
        id -> Uuid,
        user_id -> Uuid,
        club_id -> Uuid,
        /// `pending`, `accepted` or `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        resolved_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        message -> Text,
        /// Cleared when the application is deleted with its club.
        application_id -> Nullable<Uuid>,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    posts (id) {
        id -> Uuid,
        club_id -> Uuid,
        author_id -> Uuid,
        text -> Text,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    post_comments (id) {
        id -> Uuid,
        post_id -> Uuid,
        author_id -> Uuid,
        text -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    post_likes (post_id, user_id) {
        post_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::joinable!(users -> universities (university_id));
diesel::joinable!(clubs -> universities (university_id));
diesel::joinable!(follows -> clubs (club_id));
diesel::joinable!(club_members -> clubs (club_id));
diesel::joinable!(club_applications -> clubs (club_id));
diesel::joinable!(notifications -> club_applications (application_id));
diesel::joinable!(posts -> clubs (club_id));
diesel::joinable!(post_comments -> posts (post_id));
diesel::joinable!(post_likes -> posts (post_id));

diesel::allow_tables_to_appear_in_same_query!(
    universities,
    users,
    clubs,
    follows,
    club_members,
    club_applications,
    notifications,
    posts,
    post_comments,
    post_likes,
);
