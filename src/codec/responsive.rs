//! Class encoding of responsive grid regions.

use crate::region::{GridAttrs, GridSpan};

use super::markup::StartTag;

const REGION_CLASSES: [&str; 2] = ["perc-region", "perc-fluid"];
const ROW_CLASS: &str = "row";
const COLUMNS_CLASS: &str = "columns";

pub(super) fn attrs_from_tag(tag: &StartTag) -> GridAttrs {
    GridAttrs {
        row: tag.has_class(ROW_CLASS),
        columns: tag.has_class(COLUMNS_CLASS),
        large: tag.classes.iter().find_map(|class| GridSpan::parse(class)),
    }
}

pub(super) fn tag_from_attrs(region_id: &str, attrs: &GridAttrs) -> StartTag {
    let mut tag = StartTag::new(region_id);
    for class in REGION_CLASSES {
        tag.push_class(class);
    }
    if attrs.row {
        tag.push_class(ROW_CLASS);
    }
    if let Some(span) = attrs.large {
        tag.push_class(span.to_string());
    }
    if attrs.columns {
        tag.push_class(COLUMNS_CLASS);
    }
    tag
}
