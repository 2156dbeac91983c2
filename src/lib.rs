//! Region and widget layout model for page templates.
//!
//! A template's layout is a tree of nested regions. Leaf regions hold
//! widgets; containers stack their children vertically or horizontally
//! (base layout) or alternate rows and 12-unit columns (responsive layout).
//! The crate keeps that tree consistent under structural edits, converts it
//! to and from its stored markup form, and wraps both in a [`TemplateModel`]
//! that handles persistence, logging and metrics.

pub mod codec;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod region;
pub mod registry;
pub mod services;

pub use codec::{
    RegionChild, RegionNode, RegionTreeDocument, RegionWidgets, TemplateDocument,
    regions_from_tree, tree_from_regions,
};
pub use editor::{
    BaseLayoutEditor, Direction, EditScope, LayoutEditor, RemovedRegion, ResponsiveLayoutEditor,
    editor_for,
};
pub use error::{LayoutError, Rejection, Result};
pub use geometry::Size;
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{EditMetricSnapshot, EditMetrics};
pub use model::{
    AssetSource, ConversionConfig, ConversionOutcome, ConversionState, ModelConfig,
    TemplateModel,
};
pub use region::{
    BaseAttrs, GridAttrs, GridSpan, LayoutMode, Owner, Region, RegionId, RegionLayout,
    RegionTree, WalkResult, Widget, WidgetId, walk,
};
pub use registry::IdRegistry;
pub use services::{
    AssetConversionRequest, AssetResponse, AssetService, SurfaceMeasure, TemplateStore,
    WarningSink,
};
