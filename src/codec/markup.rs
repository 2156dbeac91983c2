//! Reading and writing the `<div ...>` start tags that carry region attributes.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{LayoutError, Result};

pub const END_TAG: &str = "</div>";

static ATTRIBUTE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static STYLE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn attribute_pattern() -> Option<&'static Regex> {
    ATTRIBUTE_RE
        .get_or_init(|| Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).ok())
        .as_ref()
}

fn style_pattern() -> Option<&'static Regex> {
    STYLE_RE
        .get_or_init(|| Regex::new(r"([A-Za-z-]+)\s*:\s*([^;]*);?").ok())
        .as_ref()
}

/// Parsed form of a region start tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartTag {
    pub id: String,
    pub classes: Vec<String>,
    pub style: Vec<(String, String)>,
    /// Every other attribute, in document order.
    pub attributes: Vec<(String, String)>,
}

impl StartTag {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn parse(region_id: &str, tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if !tag.starts_with("<div") || !tag.ends_with('>') {
            return Err(invalid(region_id, "start tag is not a div element"));
        }
        let pattern =
            attribute_pattern().ok_or_else(|| invalid(region_id, "attribute pattern unavailable"))?;

        let mut parsed = Self::new(region_id);
        for captures in pattern.captures_iter(tag) {
            let name = &captures[1];
            let value = unescape(&captures[2]);
            match name {
                "id" => parsed.id = value,
                "class" => parsed.classes = value.split_whitespace().map(str::to_string).collect(),
                "style" => parsed.style = parse_style(&value),
                _ => parsed.attributes.push((name.to_string(), value)),
            }
        }
        if parsed.id != region_id {
            return Err(invalid(
                region_id,
                &format!("start tag names region `{}`", parsed.id),
            ));
        }
        Ok(parsed)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    /// Value of a style property, `""` when absent.
    pub fn style_value(&self, key: &str) -> String {
        self.style
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    pub fn push_class(&mut self, class: impl Into<String>) {
        self.classes.push(class.into());
    }

    /// Record a style property unless its value is blank.
    pub fn push_style(&mut self, key: &str, value: &str) {
        if !value.trim().is_empty() {
            self.style.push((key.to_string(), value.to_string()));
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!(r#"<div id="{}""#, escape(&self.id));
        if !self.classes.is_empty() {
            out.push_str(&format!(r#" class="{}""#, escape(&self.classes.join(" "))));
        }
        if !self.style.is_empty() {
            let style: String = self
                .style
                .iter()
                .map(|(key, value)| format!("{key}:{value};"))
                .collect();
            out.push_str(&format!(r#" style="{}""#, escape(&style)));
        }
        for (name, value) in &self.attributes {
            out.push_str(&format!(r#" {name}="{}""#, escape(value)));
        }
        out.push('>');
        out
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    let Some(pattern) = style_pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(style)
        .map(|captures| {
            (
                captures[1].to_ascii_lowercase(),
                captures[2].trim().to_string(),
            )
        })
        .collect()
}

fn invalid(region_id: &str, reason: &str) -> LayoutError {
    LayoutError::InvalidMarkup {
        region: region_id.to_string(),
        reason: reason.to_string(),
    }
}

fn is_number(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit() || c == '.') && value.parse::<f64>().is_ok()
}

/// Append `px` to a bare number; anything unit-qualified passes through.
pub fn with_px(value: &str) -> String {
    let value = value.trim();
    if is_number(value) {
        format!("{value}px")
    } else {
        value.to_string()
    }
}

/// Inverse of [`with_px`].
pub fn strip_px(value: &str) -> String {
    let value = value.trim();
    match value.strip_suffix("px") {
        Some(number) if is_number(number.trim()) => number.trim().to_string(),
        _ => value.to_string(),
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classes_style_and_extra_attributes() {
        let tag = r#"<div id="nav" class="perc-region perc-horizontal  sidebar" style="width: 200px;height:auto;margin:0 auto" data-role="menu" title="Main &amp; more">"#;
        let parsed = StartTag::parse("nav", tag).unwrap();

        assert!(parsed.has_class("perc-horizontal"));
        assert!(parsed.has_class("sidebar"));
        assert_eq!(parsed.style_value("width"), "200px");
        assert_eq!(parsed.style_value("height"), "auto");
        assert_eq!(parsed.style_value("margin"), "0 auto");
        assert_eq!(parsed.style_value("padding"), "");
        assert_eq!(
            parsed.attributes,
            vec![
                ("data-role".to_string(), "menu".to_string()),
                ("title".to_string(), "Main & more".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_foreign_tags() {
        assert!(matches!(
            StartTag::parse("a", "<span id=\"a\">"),
            Err(LayoutError::InvalidMarkup { .. })
        ));
        assert!(matches!(
            StartTag::parse("a", "<div id=\"b\">"),
            Err(LayoutError::InvalidMarkup { .. })
        ));
    }

    #[test]
    fn render_then_parse_keeps_everything() {
        let mut tag = StartTag::new("r1");
        tag.push_class("perc-region");
        tag.push_style("width", &with_px("120"));
        tag.push_style("height", "");
        tag.attributes.push(("title".into(), "\"quoted\"".into()));

        let text = tag.render();
        assert_eq!(
            text,
            r#"<div id="r1" class="perc-region" style="width:120px;" title="&quot;quoted&quot;">"#
        );
        assert_eq!(StartTag::parse("r1", &text).unwrap(), tag);
    }

    #[test]
    fn pixel_suffix_only_touches_numbers() {
        assert_eq!(with_px("200"), "200px");
        assert_eq!(with_px("12.5"), "12.5px");
        assert_eq!(with_px("50%"), "50%");
        assert_eq!(with_px("auto"), "auto");
        assert_eq!(strip_px("200px"), "200");
        assert_eq!(strip_px("2em"), "2em");
        assert_eq!(strip_px("px"), "px");
    }
}
