//! Campus clubs service library.
//!
//! Hexagonal layout: [`domain`] holds the entities, authorization gate and
//! use-case services; [`inbound`] adapts HTTP requests onto driving ports;
//! [`outbound`] implements the driven ports over memory, PostgreSQL and the
//! filesystem; [`middleware`] carries per-request concerns.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
