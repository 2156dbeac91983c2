//! Class and style encoding of fixed-layout regions.

use crate::region::BaseAttrs;

use super::markup::{StartTag, strip_px, with_px};

const REGION_CLASS: &str = "perc-region";
const VERTICAL_CLASS: &str = "perc-vertical";
const HORIZONTAL_CLASS: &str = "perc-horizontal";
const FIXED_CLASS: &str = "perc-fixed";
const NO_AUTO_RESIZE_CLASS: &str = "perc-noautoresize";

const RESERVED: [&str; 5] = [
    REGION_CLASS,
    VERTICAL_CLASS,
    HORIZONTAL_CLASS,
    FIXED_CLASS,
    NO_AUTO_RESIZE_CLASS,
];

pub(super) fn attrs_from_tag(tag: &StartTag) -> BaseAttrs {
    let css_class = tag
        .classes
        .iter()
        .filter(|class| !RESERVED.contains(&class.as_str()))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    BaseAttrs {
        vertical: !tag.has_class(HORIZONTAL_CLASS),
        fixed: tag.has_class(FIXED_CLASS),
        width: strip_px(&tag.style_value("width")),
        height: strip_px(&tag.style_value("height")),
        no_auto_resize: tag.has_class(NO_AUTO_RESIZE_CLASS),
        margin: tag.style_value("margin"),
        padding: tag.style_value("padding"),
        css_class,
        attributes: tag.attributes.clone(),
    }
}

pub(super) fn tag_from_attrs(region_id: &str, attrs: &BaseAttrs) -> StartTag {
    let mut tag = StartTag::new(region_id);
    tag.push_class(REGION_CLASS);
    tag.push_class(if attrs.vertical {
        VERTICAL_CLASS
    } else {
        HORIZONTAL_CLASS
    });
    if attrs.fixed {
        tag.push_class(FIXED_CLASS);
    }
    if attrs.no_auto_resize {
        tag.push_class(NO_AUTO_RESIZE_CLASS);
    }
    for class in attrs.css_class.split_whitespace() {
        tag.push_class(class);
    }

    tag.push_style("width", &with_px(&attrs.width));
    tag.push_style("height", &with_px(&attrs.height));
    tag.push_style("margin", &attrs.margin);
    tag.push_style("padding", &attrs.padding);
    tag.attributes = attrs.attributes.clone();
    tag
}
