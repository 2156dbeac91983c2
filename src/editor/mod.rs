//! Structural edit operations on a [`RegionTree`].
//!
//! One [`LayoutEditor`] implementation exists per [`LayoutMode`]; the
//! template model picks it once with [`editor_for`] when a template loads.
//! Widget operations are identical in both modes and live in [`widgets`].

mod base;
mod responsive;
pub mod widgets;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::error::{LayoutError, Rejection, Result};
use crate::region::{
    LayoutMode, Owner, Region, RegionId, RegionTree, WalkResult, Widget, WidgetId, walk,
};
use crate::services::SurfaceMeasure;

pub use base::BaseLayoutEditor;
pub use responsive::ResponsiveLayoutEditor;

/// Where a new region goes relative to the target region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Center,
    /// Right after the target, as its sibling along a horizontal axis.
    After,
    /// Right after the target, as its sibling along a vertical axis.
    Below,
}

impl Direction {
    pub const ALL: [Direction; 7] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Center,
        Direction::After,
        Direction::Below,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South | Self::Below)
    }

    pub fn appends(self) -> bool {
        matches!(self, Self::South | Self::East | Self::After | Self::Below)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Center => "center",
            Self::After => "after",
            Self::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region direction `{0}`")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseDirectionError(value.to_string()))
    }
}

/// Whether edits come from the shared template or from a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditScope {
    #[default]
    Template,
    Page,
}

/// Summary of a region removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedRegion {
    /// Index the region occupied under its parent.
    pub index: usize,
    /// The region as it was when removed, subtree included.
    pub region: Region,
    /// Ids of the removed region's direct children.
    pub children: Vec<RegionId>,
}

/// Mode-specific region edits plus the shared widget edits.
pub trait LayoutEditor: Send + Sync {
    fn mode(&self) -> LayoutMode;

    /// Add a region next to or inside `region_id`; returns the new region's id.
    fn add_region(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        direction: Direction,
    ) -> Result<RegionId>;

    fn remove_region(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        delete_content: bool,
    ) -> Result<RemovedRegion>;

    /// Region that receives a widget dropped on `region_id`. May create one.
    fn widget_target(
        &self,
        tree: &mut RegionTree,
        scope: EditScope,
        region_id: &str,
    ) -> Result<RegionId> {
        let _ = scope;
        widgets::check_widget_target(tree, region_id)?;
        Ok(region_id.to_string())
    }

    fn add_widget(
        &self,
        tree: &mut RegionTree,
        scope: EditScope,
        region_id: &str,
        definition_id: &str,
        before: Option<&str>,
    ) -> Result<WidgetId> {
        let target = self.widget_target(tree, scope, region_id)?;
        widgets::add_widget(tree, &target, definition_id, before)
    }

    fn remove_widget(&self, tree: &mut RegionTree, region_id: &str, widget_id: &str) -> Result<bool> {
        widgets::remove_widget(tree, region_id, widget_id)
    }

    fn move_widget(
        &self,
        tree: &mut RegionTree,
        from_region: &str,
        widget_id: &str,
        to_region: &str,
        index: usize,
    ) -> Result<bool> {
        widgets::move_widget(tree, from_region, widget_id, to_region, index)
    }

    fn move_region(&self, tree: &mut RegionTree, region_id: &str, index: usize) -> Result<bool> {
        widgets::move_region(tree, region_id, index)
    }
}

/// Editor matching a tree's layout mode.
pub fn editor_for(mode: LayoutMode, surface: Arc<dyn SurfaceMeasure>) -> Box<dyn LayoutEditor> {
    match mode {
        LayoutMode::Base => Box::new(BaseLayoutEditor::new(surface)),
        LayoutMode::Responsive => Box::new(ResponsiveLayoutEditor::new()),
    }
}

/// Ensure `region_id` can be removed and return its parent's id.
pub(crate) fn check_removable(tree: &RegionTree, region_id: &str) -> Result<RegionId> {
    if tree.is_root(region_id) {
        return Err(Rejection::RootRegion.into());
    }
    let (parent, _) = tree
        .parent_of(region_id)
        .ok_or_else(|| LayoutError::RegionNotFound(region_id.to_string()))?;
    if tree.is_root(&parent.id) && parent.children.len() == 1 {
        return Err(Rejection::LastRootChild.into());
    }
    Ok(parent.id.clone())
}

pub(crate) fn first_leaf_mut(region: &mut Region) -> &mut Region {
    if region.children.is_empty() {
        region
    } else {
        first_leaf_mut(&mut region.children[0])
    }
}

/// Append `widgets` to `receiver`, promoting its owner when page content moved in.
pub(crate) fn adopt_widgets(receiver: &mut Region, widgets: Vec<Widget>, owner: Owner) {
    if widgets.is_empty() {
        return;
    }
    receiver.widgets.extend(widgets);
    if owner == Owner::Page {
        receiver.owner = Owner::Page;
    }
}

pub(crate) fn child_ids(region: &Region) -> Vec<RegionId> {
    region.children.iter().map(|child| child.id.clone()).collect()
}

pub(crate) fn require_region<'a>(tree: &'a RegionTree, region_id: &str) -> Result<&'a Region> {
    tree.region(region_id)
        .ok_or_else(|| LayoutError::RegionNotFound(region_id.to_string()))
}

pub(crate) fn require_region_mut<'a>(
    tree: &'a mut RegionTree,
    region_id: &str,
) -> Result<&'a mut Region> {
    tree.region_mut(region_id)
        .ok_or_else(|| LayoutError::RegionNotFound(region_id.to_string()))
}

/// Every widget of a subtree in pre-order, with `Page` if any came from a page-owned region.
pub(crate) fn collect_widgets(region: &mut Region) -> (Vec<Widget>, Owner) {
    let mut owner = Owner::Template;
    let mut has_page = |node: &Region| {
        if node.owner == Owner::Page && !node.widgets.is_empty() {
            owner = Owner::Page;
        }
        WalkResult::Continue
    };
    walk(region, &mut has_page);

    let mut widgets = Vec::new();
    drain_widgets(region, &mut widgets);
    (widgets, owner)
}

fn drain_widgets(region: &mut Region, into: &mut Vec<Widget>) {
    into.append(&mut region.widgets);
    for child in &mut region.children {
        drain_widgets(child, into);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_parse_case_insensitively() {
        assert_eq!("East".parse::<Direction>().unwrap(), Direction::East);
        assert_eq!("below".parse::<Direction>().unwrap(), Direction::Below);
        assert!("up".parse::<Direction>().is_err());
        assert!(Direction::Below.is_vertical());
        assert!(!Direction::West.appends());
    }

    #[test]
    fn removing_root_or_its_last_child_is_rejected() {
        let tree = RegionTree::with_registry(LayoutMode::Base, crate::registry::IdRegistry::with_seed(1));
        let only = tree.root().children[0].id.clone();
        assert_eq!(
            check_removable(&tree, "container").unwrap_err().rejection(),
            Some(Rejection::RootRegion)
        );
        assert_eq!(
            check_removable(&tree, &only).unwrap_err().rejection(),
            Some(Rejection::LastRootChild)
        );
        assert!(matches!(
            check_removable(&tree, "ghost"),
            Err(LayoutError::RegionNotFound(_))
        ));
    }
}
