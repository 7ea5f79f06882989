//! Role-based access control for record operations.
//!
//! # Responsibilities
//!
//! - Resolve a principal's role to its permission set ([`AccessPolicy`]).
//! - Read the gateway-authenticated principal from request headers.
//! - Record every authorization decision to an [`audit::AuditSink`].
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** The gate decides; `crate::crypto` executes.
//! - The policy table is immutable once built.

pub mod audit;
pub mod policy;
pub mod principal;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, TracingAuditSink};
pub use policy::{AccessPolicy, Permission, Role};
