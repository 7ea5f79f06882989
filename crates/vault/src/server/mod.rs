//! Axum HTTP server: routing, request handlers, and shared state.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Enforce the order principal → authorize → field transform on every
//!   record request.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod router;
pub mod state;
