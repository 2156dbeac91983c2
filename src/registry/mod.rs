//! Identifier registry scoped to one loaded template.

mod core;

pub use core::{IdRegistry, REGION_ID_PREFIX, WIDGET_ID_CEILING};
