//! Template model: the owner of one loaded template's region tree.
//!
//! Every edit goes through [`TemplateModel`], which routes it to the layout
//! editor of the tree's mode, reports rejections to the warning sink and
//! records logs and metrics as configured in [`ModelConfig`].

mod config;
mod conversion;
mod core;

pub use config::{ConversionConfig, ModelConfig};
pub use conversion::{AssetSource, ConversionOutcome, ConversionState, PendingConversion};
pub use core::TemplateModel;
