use std::collections::HashSet;

use crate::error::{LayoutError, Result};
use crate::registry::IdRegistry;

use super::core::{GridAttrs, LayoutMode, Region, RegionId, RegionLayout, Widget, WidgetId};

/// Id of the outer container every template tree starts from.
pub const ROOT_REGION_ID: &str = "container";

/// Visitor verdict for [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkResult {
    Continue,
    /// Skip this node's subtree and end the whole traversal.
    Stop,
}

/// Depth-first pre-order traversal. Returns `true` when a visit stopped it.
pub fn walk<'a, F>(region: &'a Region, visit: &mut F) -> bool
where
    F: FnMut(&'a Region) -> WalkResult,
{
    if visit(region) == WalkResult::Stop {
        return true;
    }
    region.children.iter().any(|child| walk(child, visit))
}

fn find_mut<'a>(region: &'a mut Region, id: &str) -> Option<&'a mut Region> {
    if region.id == id {
        return Some(region);
    }
    region
        .children
        .iter_mut()
        .find_map(|child| find_mut(child, id))
}

fn parent_mut<'a>(region: &'a mut Region, child_id: &str) -> Option<(&'a mut Region, usize)> {
    if let Some(index) = region.children.iter().position(|child| child.id == child_id) {
        return Some((region, index));
    }
    region
        .children
        .iter_mut()
        .find_map(|child| parent_mut(child, child_id))
}

fn owner_mut<'a>(region: &'a mut Region, widget_id: &str) -> Option<&'a mut Region> {
    if region.widget_index(widget_id).is_some() {
        return Some(region);
    }
    region
        .children
        .iter_mut()
        .find_map(|child| owner_mut(child, widget_id))
}

/// Index of `child_id` among `parent`'s children.
///
/// A miss means the caller and the tree are out of sync, so it is an error
/// rather than an `Option`.
pub fn region_position(parent: &Region, child_id: &str) -> Result<usize> {
    parent
        .children
        .iter()
        .position(|child| child.id == child_id)
        .ok_or_else(|| LayoutError::PositionNotFound {
            parent: parent.id.clone(),
            child: child_id.to_string(),
        })
}

/// Structural problems reported by [`RegionTree::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    RootWithoutChildren,
    RootHoldsWidgets,
    MixedContent(RegionId),
    GridOverflow { row: RegionId, units: u32 },
    DuplicateWidget(WidgetId),
}

/// Region tree of one loaded template or page.
#[derive(Debug, Clone)]
pub struct RegionTree {
    root: Region,
    mode: LayoutMode,
    ids: IdRegistry,
}

impl RegionTree {
    /// Fresh tree: the root container holding one empty region.
    pub fn new(mode: LayoutMode) -> Self {
        Self::with_registry(mode, IdRegistry::new())
    }

    pub fn with_registry(mode: LayoutMode, mut ids: IdRegistry) -> Self {
        let registered = ids.register_region(ROOT_REGION_ID);
        debug_assert!(
            registered.is_ok(),
            "registry already holds the root region id `container`"
        );
        let child_id = ids.next_region_id();
        let (root, child) = match mode {
            LayoutMode::Base => (
                Region::base(ROOT_REGION_ID, true),
                Region::base(child_id, true),
            ),
            LayoutMode::Responsive => (
                Region::grid(ROOT_REGION_ID, GridAttrs::block()),
                Region::grid(child_id, GridAttrs::row()),
            ),
        };
        Self {
            root: root.with_children(vec![child]),
            mode,
            ids,
        }
    }

    /// Assemble a tree whose region ids are already registered in `ids`.
    pub fn from_parts(root: Region, mode: LayoutMode, ids: IdRegistry) -> Self {
        Self { root, mode, ids }
    }

    pub fn root(&self) -> &Region {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Region {
        &mut self.root
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn is_root(&self, region_id: &str) -> bool {
        self.root.id == region_id
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    /// Visit every region from the root; see [`walk`].
    pub fn each_region<'a, F>(&'a self, mut visit: F) -> bool
    where
        F: FnMut(&'a Region) -> WalkResult,
    {
        walk(&self.root, &mut visit)
    }

    pub fn region(&self, region_id: &str) -> Option<&Region> {
        let mut found = None;
        self.each_region(|region| {
            if region.id == region_id {
                found = Some(region);
                WalkResult::Stop
            } else {
                WalkResult::Continue
            }
        });
        found
    }

    pub fn region_mut(&mut self, region_id: &str) -> Option<&mut Region> {
        find_mut(&mut self.root, region_id)
    }

    /// Parent of `region_id` and the child's index within it.
    pub fn parent_of(&self, region_id: &str) -> Option<(&Region, usize)> {
        let mut found = None;
        self.each_region(|region| {
            match region.children.iter().position(|child| child.id == region_id) {
                Some(index) => {
                    found = Some((region, index));
                    WalkResult::Stop
                }
                None => WalkResult::Continue,
            }
        });
        found
    }

    pub fn parent_of_mut(&mut self, region_id: &str) -> Option<(&mut Region, usize)> {
        parent_mut(&mut self.root, region_id)
    }

    /// Region currently holding `widget_id`.
    pub fn widget_owner(&self, widget_id: &str) -> Option<&Region> {
        let mut found = None;
        self.each_region(|region| {
            if region.widget_index(widget_id).is_some() {
                found = Some(region);
                WalkResult::Stop
            } else {
                WalkResult::Continue
            }
        });
        found
    }

    pub fn widget_owner_mut(&mut self, widget_id: &str) -> Option<&mut Region> {
        owner_mut(&mut self.root, widget_id)
    }

    pub fn widget(&self, widget_id: &str) -> Option<&Widget> {
        self.widget_owner(widget_id)
            .and_then(|region| region.widget(widget_id))
    }

    /// Apply `edit` to the region with `region_id`; `false` if it is absent.
    pub fn edit_region(&mut self, region_id: &str, edit: impl FnOnce(&mut Region)) -> bool {
        match self.region_mut(region_id) {
            Some(region) => {
                edit(region);
                true
            }
            None => false,
        }
    }

    /// Apply `edit` to the parent of `region_id`, passing the child index.
    pub fn edit_region_parent(
        &mut self,
        region_id: &str,
        edit: impl FnOnce(&mut Region, usize),
    ) -> bool {
        match self.parent_of_mut(region_id) {
            Some((parent, index)) => {
                edit(parent, index);
                true
            }
            None => false,
        }
    }

    pub fn edit_widget(&mut self, widget_id: &str, edit: impl FnOnce(&mut Widget)) -> bool {
        let Some(region) = self.widget_owner_mut(widget_id) else {
            return false;
        };
        match region.widgets.iter_mut().find(|widget| widget.id == widget_id) {
            Some(widget) => {
                edit(widget);
                true
            }
            None => false,
        }
    }

    pub fn next_region_id(&mut self) -> RegionId {
        self.ids.next_region_id()
    }

    /// Random numeric widget id not used anywhere in this tree.
    pub fn next_widget_id(&mut self) -> WidgetId {
        let root = &self.root;
        self.ids.next_widget_id(|candidate| {
            walk(root, &mut |region: &Region| {
                if region.widget_index(candidate).is_some() {
                    WalkResult::Stop
                } else {
                    WalkResult::Continue
                }
            })
        })
    }

    /// Forget the ids of a region subtree that left the tree.
    pub fn release_ids(&mut self, region: &Region) {
        let ids = &mut self.ids;
        walk(region, &mut |node: &Region| {
            ids.release_region(&node.id);
            WalkResult::Continue
        });
    }

    pub fn widget_ids(&self) -> HashSet<WidgetId> {
        let mut ids = HashSet::new();
        self.each_region(|region| {
            ids.extend(region.widgets.iter().map(|widget| widget.id.clone()));
            WalkResult::Continue
        });
        ids
    }

    pub fn region_count(&self) -> usize {
        let mut count = 0;
        self.each_region(|_| {
            count += 1;
            WalkResult::Continue
        });
        count
    }

    /// Collect every steady-state invariant the tree currently breaks.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        if self.root.children.is_empty() {
            violations.push(InvariantViolation::RootWithoutChildren);
        }
        if !self.root.widgets.is_empty() {
            violations.push(InvariantViolation::RootHoldsWidgets);
        }

        let mut seen = HashSet::new();
        self.each_region(|region| {
            if !region.children.is_empty() && !region.widgets.is_empty() {
                violations.push(InvariantViolation::MixedContent(region.id.clone()));
            }
            if let RegionLayout::Responsive(attrs) = &region.layout
                && attrs.row
            {
                let units: u32 = region
                    .children
                    .iter()
                    .filter_map(Region::span)
                    .map(|span| u32::from(span.get()))
                    .sum();
                if units > 12 {
                    violations.push(InvariantViolation::GridOverflow {
                        row: region.id.clone(),
                        units,
                    });
                }
            }
            for widget in &region.widgets {
                if !seen.insert(widget.id.clone()) {
                    violations.push(InvariantViolation::DuplicateWidget(widget.id.clone()));
                }
            }
            WalkResult::Continue
        });
        violations
    }
}
