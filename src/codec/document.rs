use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::region::{LayoutMode, Owner, RegionId, Widget};

/// Source template names with this prefix use the responsive grid.
pub const RESPONSIVE_TEMPLATE_PREFIX: &str = "perc.resp.";

/// Persisted template: metadata plus the encoded region tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source_template_name: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub css_override: String,
    pub region_tree: RegionTreeDocument,
}

impl TemplateDocument {
    pub fn is_responsive(&self) -> bool {
        self.source_template_name
            .starts_with(RESPONSIVE_TEMPLATE_PREFIX)
    }

    pub fn mode(&self) -> LayoutMode {
        if self.is_responsive() {
            LayoutMode::Responsive
        } else {
            LayoutMode::Base
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Markup tree plus the widgets placed in it, kept side by side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTreeDocument {
    pub root_region: RegionNode,
    #[serde(default)]
    pub region_widget_associations: Vec<RegionWidgets>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNode {
    pub region_id: RegionId,
    pub start_tag: String,
    pub end_tag: String,
    #[serde(default)]
    pub children: Vec<RegionChild>,
}

impl RegionNode {
    /// Child nodes that are regions, skipping template code.
    pub fn regions(&self) -> impl Iterator<Item = &RegionNode> {
        self.children.iter().filter_map(|child| match child {
            RegionChild::Region { region } => Some(region),
            RegionChild::Code { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegionChild {
    Region {
        region: RegionNode,
    },
    Code {
        #[serde(rename = "templateCode")]
        template_code: String,
    },
}

impl RegionChild {
    pub fn code(template_code: impl Into<String>) -> Self {
        Self::Code {
            template_code: template_code.into(),
        }
    }
}

/// Widgets of one region. Stored documents may contain `null` holes in
/// `widget_item`; they are skipped on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionWidgets {
    pub region_id: RegionId,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub widget_item: Vec<Option<Widget>>,
}

impl RegionWidgets {
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widget_item.iter().flatten()
    }
}
