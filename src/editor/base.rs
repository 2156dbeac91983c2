use std::sync::Arc;

use crate::error::{Rejection, Result};
use crate::geometry::split_even;
use crate::region::{LayoutMode, Region, RegionId, RegionTree, region_position};
use crate::services::SurfaceMeasure;

use super::{
    Direction, LayoutEditor, RemovedRegion, adopt_widgets, check_removable, child_ids,
    first_leaf_mut, require_region, require_region_mut,
};

/// Editor for the fixed/absolute layout where regions stack vertically or
/// horizontally and carry pixel sizes.
pub struct BaseLayoutEditor {
    surface: Arc<dyn SurfaceMeasure>,
}

/// What an insertion into a container will do, decided before mutating.
struct InsertPlan {
    split: bool,
    vertical: bool,
    append: bool,
    at: Option<usize>,
    /// Measured width to halve for horizontal splits and appends; `None`
    /// leaves the new widths blank.
    width: Option<u32>,
    auto_resize: bool,
}

impl BaseLayoutEditor {
    pub fn new(surface: Arc<dyn SurfaceMeasure>) -> Self {
        Self { surface }
    }

    /// Stored width in pixels, or the rendered width when the stored value
    /// is blank, `auto` or not a plain pixel length. `None` when the surface
    /// cannot measure the region either.
    pub fn measured_width(&self, region: &Region) -> Option<u32> {
        let stored = region.base_attrs().map(|attrs| attrs.width.as_str());
        stored
            .and_then(parse_pixels)
            .or_else(|| self.surface.measure(&region.id).map(|size| size.width))
    }

    pub fn measured_height(&self, region: &Region) -> Option<u32> {
        let stored = region.base_attrs().map(|attrs| attrs.height.as_str());
        stored
            .and_then(parse_pixels)
            .or_else(|| self.surface.measure(&region.id).map(|size| size.height))
    }

    fn wrap_center(&self, tree: &mut RegionTree, region_id: &str) -> Result<RegionId> {
        require_region(tree, region_id)?;
        let child_id = tree.next_region_id();
        let region = require_region_mut(tree, region_id)?;

        let mut child = region.clone_shallow(child_id.clone());
        let (children, widgets, owner) = region.take_content();
        child.children = children;
        child.widgets = widgets;
        child.owner = owner;
        region.children = vec![child];
        Ok(child_id)
    }

    fn insert_beside(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        direction: Direction,
    ) -> Result<RegionId> {
        require_region(tree, region_id)?;
        let vertical = direction.is_vertical();
        let Some((parent, index)) = tree.parent_of(region_id) else {
            return Err(Rejection::RootRegion.into());
        };

        if parent.children.len() > 1 && parent.is_vertical() != vertical {
            // Appending on the parent here would change its axis and reflow
            // every sibling, so the named region is split instead.
            return self.insert_into(tree, region_id, vertical, true, None);
        }
        let parent_id = parent.id.clone();
        self.insert_into(tree, &parent_id, vertical, true, Some(index + 1))
    }

    fn plan(
        &self,
        target: &Region,
        vertical: bool,
        append: bool,
        at: Option<usize>,
    ) -> InsertPlan {
        let count = target.children.len();
        let split = (target.is_vertical() != vertical && count > 1) || count == 0;

        let (width, auto_resize) = if vertical {
            (None, false)
        } else if split {
            (self.measured_width(target), true)
        } else {
            let reference = match at {
                Some(index) => &target.children[index.saturating_sub(1).min(count - 1)],
                None if append => &target.children[count - 1],
                None => &target.children[0],
            };
            let no_auto_resize = reference
                .base_attrs()
                .is_some_and(|attrs| attrs.no_auto_resize);
            (self.measured_width(reference), !no_auto_resize)
        };

        InsertPlan {
            split,
            vertical,
            append,
            at,
            width,
            auto_resize,
        }
    }

    fn insert_into(
        &self,
        tree: &mut RegionTree,
        target_id: &str,
        vertical: bool,
        append: bool,
        at: Option<usize>,
    ) -> Result<RegionId> {
        let plan = self.plan(require_region(tree, target_id)?, vertical, append, at);

        let new_id = tree.next_region_id();
        let clone_id = plan.split.then(|| tree.next_region_id());
        let target = require_region_mut(tree, target_id)?;
        let mut fresh = Region::base(new_id.clone(), plan.vertical);

        match clone_id {
            Some(clone_id) => split_region(target, fresh, clone_id, &plan),
            None => {
                let count = target.children.len();
                let index = plan
                    .at
                    .unwrap_or(if plan.append { count } else { 0 })
                    .min(count);
                if count == 1 {
                    set_vertical(target, plan.vertical);
                }
                if !plan.vertical && plan.auto_resize {
                    let reference = if plan.at.is_some() || plan.append {
                        index.saturating_sub(1)
                    } else {
                        0
                    };
                    if let Some(width) = plan.width {
                        let (new_width, reference_width) = split_even(width);
                        set_width(&mut fresh, new_width);
                        set_width(&mut target.children[reference], reference_width);
                    }
                }
                target.children.insert(index, fresh);
            }
        }
        Ok(new_id)
    }
}

/// Push the target's content down into a clone and place `fresh` beside it.
fn split_region(target: &mut Region, mut fresh: Region, clone_id: RegionId, plan: &InsertPlan) {
    let mut clone = target.clone_shallow(clone_id);
    let (children, widgets, owner) = target.take_content();
    clone.children = children;
    clone.widgets = widgets;
    clone.owner = owner;

    if !plan.vertical
        && let Some(width) = plan.width
    {
        let (new_width, clone_width) = split_even(width);
        set_width(&mut fresh, new_width);
        // A clone with children keeps its width so its descendants are not resized.
        if clone.children.is_empty() {
            set_width(&mut clone, clone_width);
        }
    }

    set_vertical(target, plan.vertical);
    target.children = if plan.append {
        vec![clone, fresh]
    } else {
        vec![fresh, clone]
    };
}

fn set_vertical(region: &mut Region, vertical: bool) {
    if let Some(attrs) = region.base_attrs_mut() {
        attrs.vertical = vertical;
    }
}

fn set_width(region: &mut Region, width: u32) {
    if let Some(attrs) = region.base_attrs_mut() {
        attrs.width = width.to_string();
    }
}

/// Parse a stored CSS length in pixels. Blank, `auto` and non-pixel units yield `None`.
pub(crate) fn parse_pixels(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    if number.is_empty() || number.eq_ignore_ascii_case("auto") {
        return None;
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|pixels| pixels.is_finite() && *pixels >= 0.0)
        .map(|pixels| pixels.round() as u32)
}

impl LayoutEditor for BaseLayoutEditor {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Base
    }

    fn add_region(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        direction: Direction,
    ) -> Result<RegionId> {
        match direction {
            Direction::Center => self.wrap_center(tree, region_id),
            Direction::After | Direction::Below => self.insert_beside(tree, region_id, direction),
            _ => {
                require_region(tree, region_id)?;
                self.insert_into(
                    tree,
                    region_id,
                    direction.is_vertical(),
                    direction.appends(),
                    None,
                )
            }
        }
    }

    fn remove_region(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        delete_content: bool,
    ) -> Result<RemovedRegion> {
        let parent_id = check_removable(tree, region_id)?;
        let parent = require_region_mut(tree, &parent_id)?;
        let index = region_position(parent, region_id)?;

        let mut removed = parent.children.remove(index);
        let children = child_ids(&removed);
        if parent.children.is_empty() {
            let vertical = removed.is_vertical();
            set_vertical(parent, vertical);
        }

        if delete_content {
            tree.release_ids(&removed);
            return Ok(RemovedRegion {
                index,
                region: removed,
                children,
            });
        }

        let snapshot = removed.clone();
        let (grandchildren, widgets, owner) = removed.take_content();
        parent.children.splice(index..index, grandchildren);
        if parent.children.is_empty() {
            adopt_widgets(parent, widgets, owner);
        } else {
            let neighbour = index.min(parent.children.len() - 1);
            adopt_widgets(first_leaf_mut(&mut parent.children[neighbour]), widgets, owner);
        }
        tree.release_ids(&removed);

        Ok(RemovedRegion {
            index,
            region: snapshot,
            children,
        })
    }
}
