use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a region inside one loaded template.
pub type RegionId = String;

/// Identifier of a widget inside one loaded template.
pub type WidgetId = String;

/// Which level authored the widgets currently held by a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    #[default]
    Template,
    Page,
}

/// Layout flavour of a whole tree, fixed when the template is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Base,
    Responsive,
}

/// Placed widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    pub definition_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub css_properties: Map<String, Value>,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, definition_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            name: String::new(),
            description: String::new(),
            properties: Map::new(),
            css_properties: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Attributes of a region in the fixed/absolute layout.
///
/// `width` and `height` hold a unitless number, `"auto"`, another CSS length
/// such as `"50%"`, or `""` for "fill the available space".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAttrs {
    pub vertical: bool,
    pub fixed: bool,
    pub width: String,
    pub height: String,
    pub no_auto_resize: bool,
    pub margin: String,
    pub padding: String,
    pub css_class: String,
    pub attributes: Vec<(String, String)>,
}

impl BaseAttrs {
    pub fn stacked(vertical: bool) -> Self {
        Self {
            vertical,
            ..Self::default()
        }
    }
}

/// Number of grid units (out of 12) a responsive column spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridSpan(u8);

impl GridSpan {
    pub const MIN: Self = Self(1);
    pub const FULL: Self = Self(12);

    pub fn new(units: u8) -> Option<Self> {
        (1..=12).contains(&units).then_some(Self(units))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Parse the `large-N` class form.
    pub fn parse(class: &str) -> Option<Self> {
        class
            .strip_prefix("large-")
            .and_then(|units| units.parse::<u8>().ok())
            .and_then(Self::new)
    }
}

impl fmt::Display for GridSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "large-{}", self.0)
    }
}

impl TryFrom<String> for GridSpan {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid grid span `{value}`"))
    }
}

impl From<GridSpan> for String {
    fn from(span: GridSpan) -> Self {
        span.to_string()
    }
}

/// Attributes of a region in the 12-column responsive grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridAttrs {
    pub row: bool,
    pub columns: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<GridSpan>,
}

impl GridAttrs {
    pub fn row() -> Self {
        Self {
            row: true,
            ..Self::default()
        }
    }

    pub fn column(span: GridSpan) -> Self {
        Self {
            row: false,
            columns: true,
            large: Some(span),
        }
    }

    /// Plain container that is neither a row nor a column (the template root).
    pub fn block() -> Self {
        Self::default()
    }
}

/// Per-mode attribute set of a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionLayout {
    Base(BaseAttrs),
    Responsive(GridAttrs),
}

impl RegionLayout {
    pub fn mode(&self) -> LayoutMode {
        match self {
            Self::Base(_) => LayoutMode::Base,
            Self::Responsive(_) => LayoutMode::Responsive,
        }
    }
}

/// Node of the region tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    #[serde(default)]
    pub children: Vec<Region>,
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub owner: Owner,
    pub layout: RegionLayout,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, layout: RegionLayout) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            widgets: Vec::new(),
            owner: Owner::Template,
            layout,
        }
    }

    pub fn base(id: impl Into<RegionId>, vertical: bool) -> Self {
        Self::new(id, RegionLayout::Base(BaseAttrs::stacked(vertical)))
    }

    pub fn grid(id: impl Into<RegionId>, attrs: GridAttrs) -> Self {
        Self::new(id, RegionLayout::Responsive(attrs))
    }

    pub fn with_children(mut self, children: Vec<Region>) -> Self {
        self.children = children;
        self
    }

    pub fn with_widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Copy of this region under a new id: the layout attributes and owner
    /// are carried over, children and widgets are not.
    pub fn clone_shallow(&self, id: impl Into<RegionId>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            widgets: Vec::new(),
            owner: self.owner,
            layout: self.layout.clone(),
        }
    }

    /// Move children, widgets and owner out of `self`, leaving it empty.
    pub fn take_content(&mut self) -> (Vec<Region>, Vec<Widget>, Owner) {
        let owner = std::mem::take(&mut self.owner);
        (
            std::mem::take(&mut self.children),
            std::mem::take(&mut self.widgets),
            owner,
        )
    }

    pub fn base_attrs(&self) -> Option<&BaseAttrs> {
        match &self.layout {
            RegionLayout::Base(attrs) => Some(attrs),
            RegionLayout::Responsive(_) => None,
        }
    }

    pub fn base_attrs_mut(&mut self) -> Option<&mut BaseAttrs> {
        match &mut self.layout {
            RegionLayout::Base(attrs) => Some(attrs),
            RegionLayout::Responsive(_) => None,
        }
    }

    pub fn grid_attrs(&self) -> Option<&GridAttrs> {
        match &self.layout {
            RegionLayout::Responsive(attrs) => Some(attrs),
            RegionLayout::Base(_) => None,
        }
    }

    pub fn grid_attrs_mut(&mut self) -> Option<&mut GridAttrs> {
        match &mut self.layout {
            RegionLayout::Responsive(attrs) => Some(attrs),
            RegionLayout::Base(_) => None,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.base_attrs().is_some_and(|attrs| attrs.vertical)
    }

    pub fn is_row(&self) -> bool {
        self.grid_attrs().is_some_and(|attrs| attrs.row)
    }

    pub fn is_column(&self) -> bool {
        self.grid_attrs().is_some_and(|attrs| attrs.columns)
    }

    pub fn span(&self) -> Option<GridSpan> {
        self.grid_attrs().and_then(|attrs| attrs.large)
    }

    pub fn set_span(&mut self, span: GridSpan) {
        if let Some(attrs) = self.grid_attrs_mut() {
            attrs.large = Some(span);
        }
    }

    pub fn widget(&self, widget_id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|widget| widget.id == widget_id)
    }

    pub fn widget_index(&self, widget_id: &str) -> Option<usize> {
        self.widgets.iter().position(|widget| widget.id == widget_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grid_span_bounds() {
        assert!(GridSpan::new(0).is_none());
        assert!(GridSpan::new(13).is_none());
        assert_eq!(GridSpan::new(12), Some(GridSpan::FULL));
        assert_eq!(GridSpan::parse("large-4").map(GridSpan::get), Some(4));
        assert_eq!(GridSpan::parse("medium-4"), None);
        assert_eq!(GridSpan::FULL.to_string(), "large-12");
    }

    #[test]
    fn clone_shallow_keeps_layout_not_content() {
        let mut attrs = BaseAttrs::stacked(true);
        attrs.width = "300".into();
        attrs.css_class = "hero".into();
        let region = Region::new("a", RegionLayout::Base(attrs.clone()))
            .with_widgets(vec![Widget::new("1", "percRawHtml")])
            .with_children(vec![Region::base("b", false)]);

        let copy = region.clone_shallow("c");
        assert_eq!(copy.id, "c");
        assert_eq!(copy.base_attrs(), Some(&attrs));
        assert!(copy.children.is_empty());
        assert!(copy.widgets.is_empty());
    }

    #[test]
    fn region_json_shape_uses_camel_case_fields() {
        let mut region = Region::grid("col", GridAttrs::column(GridSpan::new(4).unwrap()));
        region.widgets.push(
            Widget::new("42", "percRichText").with_property("title", json!("Hello")),
        );
        region.owner = Owner::Page;

        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["owner"], json!("page"));
        assert_eq!(value["layout"]["responsive"]["large"], json!("large-4"));
        assert_eq!(value["widgets"][0]["definitionId"], json!("percRichText"));

        let back: Region = serde_json::from_value(value).unwrap();
        assert_eq!(back, region);
    }
}
