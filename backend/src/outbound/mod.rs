//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a single in-process store implementing every repository port
//! - **media**: uploaded images kept in a capability-scoped directory
//! - **credentials**: salted password digests
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod credentials;
pub mod media;
pub mod memory;
pub mod persistence;
