//! Conversion between a [`RegionTree`] and its stored document form.
//!
//! The document keeps markup and widgets apart: each region is a start/end
//! tag pair whose classes and inline style carry the layout attributes,
//! while widgets live in a flat region-to-widgets association list.

mod base;
mod document;
mod markup;
mod responsive;

use std::collections::HashMap;

use crate::editor::{adopt_widgets, first_leaf_mut};
use crate::error::{LayoutError, Result};
use crate::region::{
    LayoutMode, Owner, Region, RegionId, RegionLayout, RegionTree, WalkResult, Widget, walk,
};
use crate::registry::IdRegistry;

pub use document::{
    RESPONSIVE_TEMPLATE_PREFIX, RegionChild, RegionNode, RegionTreeDocument, RegionWidgets,
    TemplateDocument,
};
pub use markup::{END_TAG, StartTag, strip_px, with_px};

pub const TEMPLATE_HEADER_CODE: &str = "#templateHeader()";
pub const TEMPLATE_FOOTER_CODE: &str = "#templateFooter()";

/// Insertion point emitted inside every leaf region.
pub fn region_placeholder(region_id: &str) -> String {
    format!("#region(\"{region_id}\")")
}

/// Build the tree described by `document` with a fresh id registry.
pub fn regions_from_tree(document: &TemplateDocument) -> Result<RegionTree> {
    regions_from_tree_with(document, IdRegistry::new())
}

/// Build the tree described by `document`, registering its region ids in `ids`.
pub fn regions_from_tree_with(
    document: &TemplateDocument,
    mut ids: IdRegistry,
) -> Result<RegionTree> {
    let mode = document.mode();
    let mut placements = Placements::new(&document.region_tree.region_widget_associations);
    let root = parse_node(&document.region_tree.root_region, mode, &mut placements, &mut ids)?;
    if root.children.is_empty() {
        return Err(LayoutError::InvalidMarkup {
            region: root.id,
            reason: "root region holds no regions".to_string(),
        });
    }
    Ok(RegionTree::from_parts(root, mode, ids))
}

/// Encode `tree` as markup plus widget associations.
pub fn tree_from_regions(tree: &RegionTree) -> RegionTreeDocument {
    let mut root_region = emit_node(tree.root());
    root_region
        .children
        .insert(0, RegionChild::code(TEMPLATE_HEADER_CODE));
    root_region
        .children
        .push(RegionChild::code(TEMPLATE_FOOTER_CODE));

    let mut region_widget_associations = Vec::new();
    walk(tree.root(), &mut |region: &Region| {
        if region.is_leaf() && !region.widgets.is_empty() {
            region_widget_associations.push(RegionWidgets {
                region_id: region.id.clone(),
                owner: region.owner,
                widget_item: region.widgets.iter().cloned().map(Some).collect(),
            });
        }
        WalkResult::Continue
    });

    RegionTreeDocument {
        root_region,
        region_widget_associations,
    }
}

/// Widgets waiting to be attached to the region they were stored for.
struct Placements {
    by_region: HashMap<RegionId, (Owner, Vec<Widget>)>,
}

impl Placements {
    fn new(associations: &[RegionWidgets]) -> Self {
        let mut by_region: HashMap<RegionId, (Owner, Vec<Widget>)> = HashMap::new();
        for association in associations {
            let entry = by_region
                .entry(association.region_id.clone())
                .or_insert_with(|| (Owner::Template, Vec::new()));
            if association.owner == Owner::Page {
                entry.0 = Owner::Page;
            }
            entry.1.extend(association.widgets().cloned());
        }
        Self { by_region }
    }

    fn take(&mut self, region_id: &str) -> Option<(Owner, Vec<Widget>)> {
        self.by_region.remove(region_id)
    }
}

fn parse_node(
    node: &RegionNode,
    mode: LayoutMode,
    placements: &mut Placements,
    ids: &mut IdRegistry,
) -> Result<Region> {
    ids.register_region(&node.region_id)?;
    let tag = StartTag::parse(&node.region_id, &node.start_tag)?;
    let layout = match mode {
        LayoutMode::Base => RegionLayout::Base(base::attrs_from_tag(&tag)),
        LayoutMode::Responsive => RegionLayout::Responsive(responsive::attrs_from_tag(&tag)),
    };
    let children = node
        .regions()
        .map(|child| parse_node(child, mode, placements, ids))
        .collect::<Result<Vec<_>>>()?;

    let mut region = Region::new(node.region_id.clone(), layout).with_children(children);
    if let Some((owner, widgets)) = placements.take(&node.region_id) {
        // Containers never hold widgets; stored ones go to the first leaf.
        adopt_widgets(first_leaf_mut(&mut region), widgets, owner);
    }
    Ok(region)
}

fn emit_node(region: &Region) -> RegionNode {
    let tag = match &region.layout {
        RegionLayout::Base(attrs) => base::tag_from_attrs(&region.id, attrs),
        RegionLayout::Responsive(attrs) => responsive::tag_from_attrs(&region.id, attrs),
    };
    let children = if region.is_leaf() {
        vec![RegionChild::code(region_placeholder(&region.id))]
    } else {
        region
            .children
            .iter()
            .map(|child| RegionChild::Region {
                region: emit_node(child),
            })
            .collect()
    };
    RegionNode {
        region_id: region.id.clone(),
        start_tag: tag.render(),
        end_tag: END_TAG.to_string(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{BaseLayoutEditor, Direction, EditScope, LayoutEditor, ResponsiveLayoutEditor};
    use crate::geometry::Size;
    use crate::services::FixedSurface;
    use serde_json::json;
    use std::sync::Arc;

    fn document(source_template_name: &str, region_tree: RegionTreeDocument) -> TemplateDocument {
        TemplateDocument {
            id: "16777215-101-725".into(),
            name: "Home".into(),
            source_template_name: source_template_name.into(),
            theme: "percussion".into(),
            css_override: String::new(),
            region_tree,
        }
    }

    fn base_tree() -> RegionTree {
        let surface = FixedSurface::new().with_fallback(Size::new(960, 300));
        let editor = BaseLayoutEditor::new(Arc::new(surface));
        let mut tree = RegionTree::with_registry(LayoutMode::Base, IdRegistry::with_seed(7));
        let first = tree.root().children[0].id.clone();

        let east = editor.add_region(&mut tree, &first, Direction::East).unwrap();
        let south = editor.add_region(&mut tree, &east, Direction::South).unwrap();
        let left = tree.region(&first).unwrap().children[0].id.clone();
        editor
            .add_widget(&mut tree, EditScope::Page, &south, "percRichText", None)
            .unwrap();
        let widget_id = editor
            .add_widget(&mut tree, EditScope::Page, &left, "percTitle", None)
            .unwrap();
        tree.edit_widget(&widget_id, |widget| {
            widget.name = "title".into();
            widget.properties.insert("level".into(), json!(2));
        });
        tree.edit_region(&first, |region| {
            if let Some(attrs) = region.base_attrs_mut() {
                attrs.margin = "0 auto".into();
                attrs.css_class = "hero".into();
                attrs.attributes.push(("data-test".into(), "a&b".into()));
            }
        });
        tree
    }

    #[test]
    fn base_round_trip() {
        let tree = base_tree();
        let doc = document("base", tree_from_regions(&tree));

        let parsed = regions_from_tree(&doc).unwrap();
        assert_eq!(parsed.mode(), LayoutMode::Base);
        assert_eq!(parsed.root(), tree.root());
        assert_eq!(tree_from_regions(&parsed), doc.region_tree);
    }

    #[test]
    fn responsive_round_trip_through_json() {
        let editor = ResponsiveLayoutEditor::new();
        let mut tree = RegionTree::with_registry(LayoutMode::Responsive, IdRegistry::with_seed(8));
        let row = tree.root().children[0].id.clone();
        editor.add_region(&mut tree, &row, Direction::East).unwrap();
        let column = editor.add_region(&mut tree, &row, Direction::East).unwrap();
        editor.add_region(&mut tree, &column, Direction::South).unwrap();
        let leaf = tree.region(&column).unwrap().children[0].id.clone();
        editor
            .add_widget(&mut tree, EditScope::Template, &leaf, "percRawHtml", None)
            .unwrap();

        let doc = document("perc.resp.base", tree_from_regions(&tree));
        let text = doc.to_json().unwrap();
        let reread = TemplateDocument::from_json(&text).unwrap();
        assert_eq!(reread, doc);

        let parsed = regions_from_tree(&reread).unwrap();
        assert_eq!(parsed.mode(), LayoutMode::Responsive);
        assert_eq!(parsed.root(), tree.root());
        assert_eq!(tree_from_regions(&parsed), doc.region_tree);
        assert!(parsed.check_invariants().is_empty());
    }

    #[test]
    fn root_carries_header_footer_and_leaves_carry_placeholders() {
        let tree = RegionTree::with_registry(LayoutMode::Base, IdRegistry::with_seed(1));
        let encoded = tree_from_regions(&tree);
        let root = &encoded.root_region;

        assert_eq!(root.children.first(), Some(&RegionChild::code(TEMPLATE_HEADER_CODE)));
        assert_eq!(root.children.last(), Some(&RegionChild::code(TEMPLATE_FOOTER_CODE)));
        let leaf = root.regions().next().unwrap();
        assert_eq!(
            leaf.children,
            vec![RegionChild::code(region_placeholder("temp-region-1"))]
        );
        assert!(encoded.region_widget_associations.is_empty());
    }

    #[test]
    fn parses_hand_written_markup() {
        let region = |id: &str, tag: &str, children: Vec<RegionChild>| RegionNode {
            region_id: id.into(),
            start_tag: tag.into(),
            end_tag: END_TAG.into(),
            children,
        };
        let nav = region(
            "nav",
            r#"<div id="nav" class="perc-region perc-vertical" style="width:200px;padding: 5px">"#,
            vec![RegionChild::code("<p>static</p>")],
        );
        let root = region(
            "container",
            r#"<div id="container" class="perc-region perc-horizontal">"#,
            vec![RegionChild::Region { region: nav }],
        );
        let tree_doc = RegionTreeDocument {
            root_region: root,
            region_widget_associations: vec![
                RegionWidgets {
                    region_id: "nav".into(),
                    owner: Owner::Page,
                    widget_item: vec![None, Some(Widget::new("5", "percNavigation"))],
                },
                RegionWidgets {
                    region_id: "gone".into(),
                    owner: Owner::Page,
                    widget_item: vec![Some(Widget::new("6", "percTitle"))],
                },
            ],
        };

        let tree = regions_from_tree(&document("base", tree_doc)).unwrap();
        assert!(!tree.root().is_vertical());
        let nav = tree.region("nav").unwrap();
        let attrs = nav.base_attrs().unwrap();
        assert_eq!(attrs.width, "200");
        assert_eq!(attrs.height, "");
        assert_eq!(attrs.padding, "5px");
        assert_eq!(nav.owner, Owner::Page);
        assert_eq!(nav.widgets, vec![Widget::new("5", "percNavigation")]);
        assert!(tree.widget("6").is_none());
        assert!(tree.ids().contains_region("nav"));
    }

    #[test]
    fn duplicate_ids_and_empty_roots_are_rejected() {
        let leaf = |id: &str| RegionChild::Region {
            region: RegionNode {
                region_id: id.into(),
                start_tag: format!(r#"<div id="{id}" class="perc-region">"#),
                end_tag: END_TAG.into(),
                children: Vec::new(),
            },
        };
        let root = |children| RegionNode {
            region_id: "container".into(),
            start_tag: r#"<div id="container" class="perc-region">"#.into(),
            end_tag: END_TAG.into(),
            children,
        };

        let duplicated = RegionTreeDocument {
            root_region: root(vec![leaf("a"), leaf("a")]),
            region_widget_associations: Vec::new(),
        };
        assert!(matches!(
            regions_from_tree(&document("base", duplicated)),
            Err(LayoutError::DuplicateRegionId(id)) if id == "a"
        ));

        let empty = RegionTreeDocument {
            root_region: root(vec![RegionChild::code(TEMPLATE_HEADER_CODE)]),
            region_widget_associations: Vec::new(),
        };
        assert!(matches!(
            regions_from_tree(&document("base", empty)),
            Err(LayoutError::InvalidMarkup { .. })
        ));
    }
}
