use crate::error::{Rejection, Result};
use crate::region::{GridAttrs, GridSpan, LayoutMode, Region, RegionId, RegionTree, region_position};

use super::widgets::check_widget_target;
use super::{
    Direction, EditScope, LayoutEditor, RemovedRegion, adopt_widgets, check_removable, child_ids,
    collect_widgets, first_leaf_mut, require_region, require_region_mut,
};

/// Grid units available in one row.
pub const GRID_UNITS: u32 = 12;

/// Editor for the 12-column responsive grid where rows hold columns and
/// columns hold rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponsiveLayoutEditor;

impl ResponsiveLayoutEditor {
    pub fn new() -> Self {
        Self
    }

    /// A row that already holds twelve columns cannot take another.
    pub fn is_insertable(region: &Region) -> bool {
        !(region.is_row() && region.children.len() >= GRID_UNITS as usize)
    }

    fn wrap_center(&self, tree: &mut RegionTree, region_id: &str) -> Result<RegionId> {
        if require_region(tree, region_id)?.is_leaf() {
            let child_id = tree.next_region_id();
            promote_leaf(require_region_mut(tree, region_id)?, child_id.clone());
            Ok(child_id)
        } else {
            let outer_id = tree.next_region_id();
            let inner_id = tree.next_region_id();
            wrap_content(require_region_mut(tree, region_id)?, outer_id.clone(), inner_id);
            Ok(outer_id)
        }
    }

    fn add_column(
        &self,
        tree: &mut RegionTree,
        target_id: &str,
        append: bool,
        at: Option<usize>,
    ) -> Result<RegionId> {
        let target = require_region(tree, target_id)?;
        if !Self::is_insertable(target) {
            return Err(Rejection::GridFull.into());
        }
        let (is_row, is_leaf) = (target.is_row(), target.is_leaf());

        let new_id = tree.next_region_id();
        let row_id = if is_row {
            if is_leaf {
                let column_id = tree.next_region_id();
                promote_leaf(require_region_mut(tree, target_id)?, column_id);
            }
            target_id.to_string()
        } else {
            let row_id = tree.next_region_id();
            let column_id = tree.next_region_id();
            wrap_content(require_region_mut(tree, target_id)?, row_id.clone(), column_id);
            row_id
        };

        let row = require_region_mut(tree, &row_id)?;
        let count = row.children.len();
        let index = at.unwrap_or(if append { count } else { 0 }).min(count);
        row.children
            .insert(index, Region::grid(new_id.clone(), GridAttrs::column(GridSpan::MIN)));
        if !adjust_sibling_columns(row, index) {
            let column = row.children.remove(index);
            tree.release_ids(&column);
            return Err(Rejection::GridFull.into());
        }
        Ok(new_id)
    }

    fn add_row(
        &self,
        tree: &mut RegionTree,
        target_id: &str,
        append: bool,
        at: Option<usize>,
    ) -> Result<RegionId> {
        let target = require_region(tree, target_id)?;
        let (is_row, is_leaf) = (target.is_row(), target.is_leaf());

        let new_id = tree.next_region_id();
        let container_id = if is_row {
            if is_leaf {
                let column_id = tree.next_region_id();
                promote_leaf(require_region_mut(tree, target_id)?, column_id);
            }
            let outer_id = tree.next_region_id();
            let inner_id = tree.next_region_id();
            wrap_content(require_region_mut(tree, target_id)?, outer_id.clone(), inner_id);
            outer_id
        } else {
            if is_leaf {
                let row_id = tree.next_region_id();
                promote_leaf(require_region_mut(tree, target_id)?, row_id);
            }
            target_id.to_string()
        };

        let container = require_region_mut(tree, &container_id)?;
        let count = container.children.len();
        let index = at.unwrap_or(if append { count } else { 0 }).min(count);
        container
            .children
            .insert(index, Region::grid(new_id.clone(), GridAttrs::row()));
        Ok(new_id)
    }

    fn insert_beside(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        direction: Direction,
    ) -> Result<RegionId> {
        let target_is_row = require_region(tree, region_id)?.is_row();
        let Some((parent, index)) = tree.parent_of(region_id) else {
            return Err(Rejection::RootRegion.into());
        };
        let parent_id = parent.id.clone();
        let parent_is_row = parent.is_row();

        match direction {
            Direction::After if parent_is_row => {
                self.add_column(tree, &parent_id, true, Some(index + 1))
            }
            Direction::After => self.add_column(tree, region_id, true, None),
            _ if !parent_is_row && target_is_row => {
                self.add_row(tree, &parent_id, true, Some(index + 1))
            }
            _ => self.add_row(tree, region_id, true, None),
        }
    }
}

/// Turn a childless region into a container of one child of the alternating
/// kind that takes over its widgets.
fn promote_leaf(region: &mut Region, child_id: RegionId) {
    let attrs = if region.is_row() {
        GridAttrs::column(GridSpan::FULL)
    } else {
        GridAttrs::row()
    };
    let (_, widgets, owner) = region.take_content();
    let mut child = Region::grid(child_id, attrs).with_widgets(widgets);
    child.owner = owner;
    region.children = vec![child];
}

/// Push a region's content two levels down so the grid keeps alternating:
/// a row becomes `row > 12-column > row > content`, anything else becomes
/// `region > row > 12-column > content`.
fn wrap_content(region: &mut Region, outer_id: RegionId, inner_id: RegionId) {
    let (outer_attrs, inner_attrs) = if region.is_row() {
        (GridAttrs::column(GridSpan::FULL), GridAttrs::row())
    } else {
        (GridAttrs::row(), GridAttrs::column(GridSpan::FULL))
    };
    let (children, widgets, owner) = region.take_content();
    let mut inner = Region::grid(inner_id, inner_attrs)
        .with_children(children)
        .with_widgets(widgets);
    inner.owner = owner;
    region.children = vec![Region::grid(outer_id, outer_attrs).with_children(vec![inner])];
}

fn occupied_units(row: &Region) -> u32 {
    row.children
        .iter()
        .filter_map(Region::span)
        .map(|span| u32::from(span.get()))
        .sum()
}

/// Borrow one grid unit for the column just inserted at `inserted` when the
/// row overflows: from the first wider sibling to its right, else the nearest
/// wider one to its left. Returns `false` when no sibling can give a unit.
///
/// Rows built by this editor always sum to the full grid, so every insert
/// into them borrows. Rows loaded from markup may sum to less; the new
/// column then takes free units and the siblings keep their spans.
fn adjust_sibling_columns(row: &mut Region, inserted: usize) -> bool {
    if occupied_units(row) <= GRID_UNITS {
        return true;
    }
    let wider = |column: &Region| column.span().is_some_and(|span| span.get() > 1);
    let donor = (inserted + 1..row.children.len())
        .find(|&index| wider(&row.children[index]))
        .or_else(|| (0..inserted).rev().find(|&index| wider(&row.children[index])));

    let Some(donor) = donor else {
        return false;
    };
    let column = &mut row.children[donor];
    if let Some(span) = column.span().and_then(|span| GridSpan::new(span.get() - 1)) {
        column.set_span(span);
    }
    true
}

impl LayoutEditor for ResponsiveLayoutEditor {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Responsive
    }

    fn add_region(
        &self,
        tree: &mut RegionTree,
        region_id: &str,
        direction: Direction,
    ) -> Result<RegionId> {
        match direction {
            Direction::North | Direction::South => {
                self.add_row(tree, region_id, direction.appends(), None)
            }
            Direction::East | Direction::West => {
                self.add_column(tree, region_id, direction.appends(), None)
            }
            Direction::Center => self.wrap_center(tree, region_id),
            Direction::After | Direction::Below => self.insert_beside(tree, region_id, direction),
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
        let receiver = (!parent.children.is_empty()).then(|| index.min(parent.children.len() - 1));

        if parent.is_row()
            && let (Some(span), Some(receiver)) = (removed.span(), receiver)
        {
            let neighbour = &mut parent.children[receiver];
            if let Some(current) = neighbour.span() {
                let merged = (current.get() + span.get()).min(GRID_UNITS as u8);
                if let Some(merged) = GridSpan::new(merged) {
                    neighbour.set_span(merged);
                }
            }
        }

        let snapshot = (!delete_content).then(|| removed.clone());
        if !delete_content {
            let (widgets, owner) = collect_widgets(&mut removed);
            match receiver {
                Some(receiver) => {
                    adopt_widgets(first_leaf_mut(&mut parent.children[receiver]), widgets, owner)
                }
                None => adopt_widgets(parent, widgets, owner),
            }
        }
        tree.release_ids(&removed);

        Ok(RemovedRegion {
            index,
            region: snapshot.unwrap_or(removed),
            children,
        })
    }

    fn widget_target(
        &self,
        tree: &mut RegionTree,
        scope: EditScope,
        region_id: &str,
    ) -> Result<RegionId> {
        if !check_widget_target(tree, region_id)?.is_row() {
            return Ok(region_id.to_string());
        }
        match scope {
            EditScope::Page => Err(Rejection::WidgetOnRow.into()),
            EditScope::Template => self.wrap_center(tree, region_id),
        }
    }
}
