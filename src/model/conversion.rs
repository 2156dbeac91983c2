use serde_json::Value;

use crate::region::{RegionId, WidgetId};

/// Content asset bound to a widget that is being converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
    pub asset_id: String,
    /// Page or template that owns the asset relationship.
    pub owner_id: String,
    pub shared: bool,
}

impl AssetSource {
    pub fn new(asset_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            owner_id: owner_id.into(),
            shared: false,
        }
    }

    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

/// How a conversion ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// The original widget is gone; `data` is the service payload, `Null`
    /// when no asset was involved.
    Converted { data: Value },
    /// The replacement widget was removed again.
    RolledBack { message: String },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Done(ConversionOutcome),
    /// Waiting for the asset service; both widgets are in the tree until
    /// the response is delivered.
    Pending { widget_id: WidgetId },
}

/// Conversion waiting for its asset response, keyed by the new widget id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConversion {
    pub region_id: RegionId,
    pub original_widget_id: WidgetId,
    pub widget_id: WidgetId,
}
