use std::sync::{Arc, Mutex};

use crate::editor::EditScope;
use crate::logging::Logger;
use crate::metrics::EditMetrics;
use crate::registry::IdRegistry;

/// Widget type and asset type produced by widget conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub widget_definition_id: String,
    pub target_asset_type: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            widget_definition_id: "percRichText".to_string(),
            target_asset_type: "percRichTextAsset".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Optional structured logger used for edit and persistence events.
    pub logger: Option<Logger>,
    /// Whether edits come from the template editor or a page editor.
    pub scope: EditScope,
    /// Prefix of every log target; events go to `<prefix>.edit`, `.persistence`
    /// and `.conversion`.
    pub log_target: String,
    /// Counters shared with the host, if enabled.
    pub metrics: Option<Arc<Mutex<EditMetrics>>>,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
    pub conversion: ConversionConfig,
    /// Seed for reproducible widget ids.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            logger: None,
            scope: EditScope::Template,
            log_target: "region_layout::model".to_string(),
            metrics: None,
            metrics_target: "region_layout::model.metrics".to_string(),
            conversion: ConversionConfig::default(),
            seed: None,
        }
    }
}

impl ModelConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_scope(mut self, scope: EditScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(EditMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<EditMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub(crate) fn id_registry(&self) -> IdRegistry {
        self.seed.map(IdRegistry::with_seed).unwrap_or_default()
    }

    pub(crate) fn target(&self, area: &str) -> String {
        format!("{}.{area}", self.log_target)
    }
}
