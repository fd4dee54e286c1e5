//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Authorization and workflow rules live in
//!   the domain services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Declared cascades**: every foreign key named by a domain cascade rule
//!   carries the matching `ON DELETE` clause in the migrations.
//! - **Strongly typed errors**: database errors map to the port error enums;
//!   named constraint violations map to their specific variants.
//!
//! # Example
//!
//! ```ignore
//! use campus_clubs::outbound::persistence::{DbPool, DieselClubRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clubs")).await?;
//! let clubs = DieselClubRepository::new(pool);
//! ```

mod diesel_application_repository;
mod diesel_basic_error_mapping;
mod diesel_club_repository;
mod diesel_post_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::{
    DieselApplicationRepository, DieselNotificationRepository,
};
pub use diesel_club_repository::{DieselClubRepository, DieselMembershipRepository};
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::{DieselUniversityRepository, DieselUserRepository};
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
