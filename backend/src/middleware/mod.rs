//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route. Wrap order,
//! outermost first: [`Trace`], the session middleware, [`RoleGate`], [`Csrf`].

pub mod csrf;
pub mod role_gate;
pub mod trace;

pub use csrf::{CSRF_HEADER, Csrf};
pub use role_gate::RoleGate;
pub use trace::Trace;
