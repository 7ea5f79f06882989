//! Common types, protocol definitions, and errors shared across `ehr-vault` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
