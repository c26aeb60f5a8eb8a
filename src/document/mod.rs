//! Intrinsic size of a vector document, read from its root element.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geometry::Size;

pub const DEFAULT_DOCUMENT_WIDTH: f64 = 1000.0;
pub const DEFAULT_DOCUMENT_HEIGHT: f64 = 1000.0;

static SVG_ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<svg\b[^>]*>").expect("valid svg root regex"));
static FIRST_ELEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[A-Za-z][^>]*>").expect("valid element regex"));
static VIEW_BOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\sviewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid viewBox regex")
});
static WIDTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\swidth\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid width regex")
});
static HEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\sheight\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid height regex")
});
static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid number regex")
});

/// Intrinsic size declared by `content`.
///
/// A usable `viewBox` wins; otherwise `width`/`height` are read with any unit
/// suffix ignored. Each dimension that is missing or not strictly positive
/// falls back to its default.
pub fn intrinsic_size(content: &str) -> Size {
    let Some(root) = root_tag(content) else {
        tracing::debug!("document has no root element; using default size");
        return default_size();
    };

    if let Some(size) = view_box_size(root) {
        return size;
    }

    let width = attribute(&WIDTH_RE, root)
        .and_then(leading_number)
        .filter(|value| *value > 0.0)
        .unwrap_or(DEFAULT_DOCUMENT_WIDTH);
    let height = attribute(&HEIGHT_RE, root)
        .and_then(leading_number)
        .filter(|value| *value > 0.0)
        .unwrap_or(DEFAULT_DOCUMENT_HEIGHT);
    Size::new(width, height)
}

pub const fn default_size() -> Size {
    Size::new(DEFAULT_DOCUMENT_WIDTH, DEFAULT_DOCUMENT_HEIGHT)
}

fn root_tag(content: &str) -> Option<&str> {
    SVG_ROOT_RE
        .find(content)
        .or_else(|| FIRST_ELEMENT_RE.find(content))
        .map(|found| found.as_str())
}

fn attribute<'a>(pattern: &Regex, tag: &'a str) -> Option<&'a str> {
    let captures = pattern.captures(tag)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| value.as_str())
}

fn view_box_size(tag: &str) -> Option<Size> {
    let raw = attribute(&VIEW_BOX_RE, tag)?;
    let values = raw
        .split(|character: char| character.is_whitespace() || character == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [_, _, width, height] = values.as_slice() else {
        tracing::debug!(view_box = raw, "ignoring malformed viewBox");
        return None;
    };
    let size = Size::new(*width, *height);
    size.is_usable().then_some(size)
}

fn leading_number(raw: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
