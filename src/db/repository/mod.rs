//! Repository layer — entity-scoped database operations.
//!
//! All public functions are re-exported here so callers go through
//! `crate::db` without caring about the split.

mod alert;
mod validation;

pub use alert::*;
pub use validation::*;
