//! Error module orchestrator.
//!
//! Every fallible operation in the crate reports through [`LayoutError`];
//! structural refusals carry a [`Rejection`] so hosts can show a warning.

mod types;

pub use types::{LayoutError, Rejection, Result};
