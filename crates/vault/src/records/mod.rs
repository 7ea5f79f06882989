//! Which record fields are sensitive, and how to reach them in a JSON record.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** Transforms are passed in as closures by the
//!   server layer.
//! - **No field values in logs.** Only record type names and path counts.

pub mod catalog;
pub mod paths;

pub use catalog::FieldCatalog;
pub use paths::{first_non_string_leaf, transform_fields};
