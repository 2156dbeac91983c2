//! Widget placement and sibling reordering, shared by both layout modes.

use crate::error::{LayoutError, Rejection, Result};
use crate::region::{Owner, Region, RegionTree, Widget, WidgetId};

use super::{require_region, require_region_mut};

/// Ensure `region_id` may hold widgets directly.
pub fn check_widget_target<'a>(tree: &'a RegionTree, region_id: &str) -> Result<&'a Region> {
    if tree.is_root(region_id) {
        return Err(Rejection::RootRegion.into());
    }
    let region = require_region(tree, region_id)?;
    if !region.children.is_empty() {
        return Err(Rejection::RegionHasChildren.into());
    }
    Ok(region)
}

/// Create a widget of `definition_id` in `region_id`, before `before` when
/// that widget is present, otherwise at the end.
pub fn add_widget(
    tree: &mut RegionTree,
    region_id: &str,
    definition_id: &str,
    before: Option<&str>,
) -> Result<WidgetId> {
    check_widget_target(tree, region_id)?;
    let widget_id = tree.next_widget_id();
    insert_widget(tree, region_id, Widget::new(widget_id.clone(), definition_id), before)?;
    Ok(widget_id)
}

/// Place an existing widget value into `region_id`.
pub fn insert_widget(
    tree: &mut RegionTree,
    region_id: &str,
    widget: Widget,
    before: Option<&str>,
) -> Result<()> {
    check_widget_target(tree, region_id)?;
    let region = require_region_mut(tree, region_id)?;
    let index = before
        .and_then(|before_id| region.widget_index(before_id))
        .unwrap_or(region.widgets.len());
    region.widgets.insert(index, widget);
    region.owner = Owner::Page;
    Ok(())
}

/// Drop `widget_id` from `region_id`. Returns whether a widget was removed.
pub fn remove_widget(tree: &mut RegionTree, region_id: &str, widget_id: &str) -> Result<bool> {
    let region = require_region_mut(tree, region_id)?;
    let before = region.widgets.len();
    region.widgets.retain(|widget| widget.id != widget_id);
    let removed = region.widgets.len() != before;
    if region.widgets.is_empty() {
        region.owner = Owner::Template;
    }
    Ok(removed)
}

/// Move a widget to `index` in `to_region`. An index past the end of the
/// destination list, or a widget missing from the source, leaves the tree
/// untouched and returns `false`.
pub fn move_widget(
    tree: &mut RegionTree,
    from_region: &str,
    widget_id: &str,
    to_region: &str,
    index: usize,
) -> Result<bool> {
    let Some(position) = require_region(tree, from_region)?.widget_index(widget_id) else {
        return Ok(false);
    };
    let destination = check_widget_target(tree, to_region)?;
    let available = if from_region == to_region {
        destination.widgets.len() - 1
    } else {
        destination.widgets.len()
    };
    if index > available {
        return Ok(false);
    }

    let source = require_region_mut(tree, from_region)?;
    let widget = source.widgets.remove(position);
    if source.widgets.is_empty() {
        source.owner = Owner::Template;
    }

    let destination = require_region_mut(tree, to_region)?;
    destination.widgets.insert(index, widget);
    destination.owner = Owner::Page;
    Ok(true)
}

/// Move a region to `index` among its siblings, shifting the ones in
/// between by one slot. Out-of-range indexes are ignored.
pub fn move_region(tree: &mut RegionTree, region_id: &str, index: usize) -> Result<bool> {
    if tree.is_root(region_id) {
        return Err(Rejection::RootRegion.into());
    }
    let (parent, from) = tree
        .parent_of_mut(region_id)
        .ok_or_else(|| LayoutError::RegionNotFound(region_id.to_string()))?;
    if index >= parent.children.len() {
        return Ok(false);
    }
    if index < from {
        parent.children[index..=from].rotate_right(1);
    } else if index > from {
        parent.children[from..=index].rotate_left(1);
    }
    Ok(true)
}
