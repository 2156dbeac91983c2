//! Region tree module orchestrator.
//!
//! Downstream modules import the node types and the traversal protocol from
//! here while the implementation lives in the private `core` and `tree`
//! modules.

mod core;
mod tree;

pub use core::{
    BaseAttrs, GridAttrs, GridSpan, LayoutMode, Owner, Region, RegionId, RegionLayout, Widget,
    WidgetId,
};
pub use tree::{
    InvariantViolation, ROOT_REGION_ID, RegionTree, WalkResult, region_position, walk,
};
