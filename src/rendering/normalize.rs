//! Canonical SVG form for the embedding pipeline.
//!
//! Search-index artifacts must be visually comparable regardless of which
//! icon set or renderer produced them, so every SVG is rewritten to a fixed
//! pixel size with an explicit viewBox and no baked-in color styling.

use regex::Regex;
use std::sync::OnceLock;

/// Canonical pixel size of normalized artifacts. Matches the input edge
/// length of the downstream embedding model.
pub const DEFAULT_TARGET_SIZE: u32 = 224;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

fn open_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<svg\b[^>]*>").unwrap())
}

fn fill_stroke_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\s(?:fill|stroke)="[^"]*""#).unwrap())
}

/// Rewrite arbitrary icon SVG markup into canonical form.
///
/// Returns `None` for empty/whitespace input ("nothing to normalize", not an
/// error). Idempotent: normalizing an already-normalized string at the same
/// target size yields the same string.
///
/// The opening `<svg>` tag is replaced with one carrying exactly the resolved
/// viewBox, `width`/`height` at `target_size`, and the SVG namespace; all
/// `fill`/`stroke` attributes anywhere in the document are stripped so the
/// consumer controls styling. Input without an `<svg>` opening tag passes
/// through with only the fill/stroke strip.
pub fn normalize(svg: &str, target_size: u32) -> Option<String> {
    if svg.trim().is_empty() {
        return None;
    }

    let rewritten = match open_tag_re().find(svg) {
        Some(open_tag) => {
            let view_box = resolve_view_box(open_tag.as_str());
            let replacement = format!(
                r#"<svg viewBox="{view_box}" width="{target_size}" height="{target_size}" xmlns="{SVG_NS}">"#
            );
            svg.replacen(open_tag.as_str(), &replacement, 1)
        }
        None => svg.to_string(),
    };

    Some(fill_stroke_re().replace_all(&rewritten, "").into_owned())
}

/// Normalize at the canonical embedding size.
pub fn normalize_default(svg: &str) -> Option<String> {
    normalize(svg, DEFAULT_TARGET_SIZE)
}

/// Resolve the canonical viewBox from an opening `<svg>` tag:
/// an existing viewBox verbatim; else `0 0 {width} {height}` when both
/// dimension attributes are present (each falling back to 24 when not
/// numeric); else `0 0 24 24`.
fn resolve_view_box(open_tag: &str) -> String {
    if let Some(vb) = attr_value(open_tag, "viewBox") {
        return vb.to_string();
    }

    let width = attr_value(open_tag, "width");
    let height = attr_value(open_tag, "height");
    if let (Some(w), Some(h)) = (width, height) {
        return format!("0 0 {} {}", dimension_or_24(w), dimension_or_24(h));
    }

    "0 0 24 24".to_string()
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(r#"{name}=""#);
    let mut search_from = 0;
    while let Some(pos) = tag[search_from..].find(&needle) {
        let at = search_from + pos;
        // Must be a whole attribute name: "width" should not match inside
        // "stroke-width".
        let preceded_ok = at == 0
            || tag[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        if preceded_ok {
            let start = at + needle.len();
            let end = tag[start..].find('"')? + start;
            return Some(&tag[start..end]);
        }
        search_from = at + needle.len();
    }
    None
}

fn dimension_or_24(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => {
            if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                format!("{n}")
            }
        }
        _ => "24".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(normalize("", 224), None);
        assert_eq!(normalize("   \n\t", 224), None);
    }

    #[test]
    fn test_existing_view_box_kept_and_fill_stripped() {
        let out = normalize(r#"<svg viewBox="0 0 16 16"><path fill="red"/></svg>"#, 100).unwrap();
        assert!(out.contains(r#"viewBox="0 0 16 16""#));
        assert!(out.contains(r#"width="100""#));
        assert!(out.contains(r#"height="100""#));
        assert!(!out.contains(r#"fill="red""#));
    }

    #[test]
    fn test_view_box_built_from_width_height() {
        let out = normalize_default(r#"<svg width="48" height="48"></svg>"#).unwrap();
        assert!(out.contains(r#"viewBox="0 0 48 48""#));
        assert!(out.contains(r#"width="224""#));
        assert!(out.contains(r#"height="224""#));
    }

    #[test]
    fn test_view_box_defaults_without_dimensions() {
        let out = normalize_default("<svg></svg>").unwrap();
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
    }

    #[test]
    fn test_unparseable_dimension_falls_back_to_24() {
        let out = normalize_default(r#"<svg width="wide" height="32"></svg>"#).unwrap();
        assert!(out.contains(r#"viewBox="0 0 24 32""#));
    }

    #[test]
    fn test_single_dimension_is_not_enough() {
        // Only width present: rule (b) needs both, so rule (c) applies.
        let out = normalize_default(r#"<svg width="48"></svg>"#).unwrap();
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
    }

    #[test]
    fn test_extraneous_root_attributes_discarded() {
        let out = normalize(
            r#"<svg class="icon icon-m" aria-hidden="true" fill="none" viewBox="0 0 24 24"><path d="M0 0h24"/></svg>"#,
            224,
        )
        .unwrap();
        assert!(!out.contains("class="));
        assert!(!out.contains("aria-hidden"));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn test_stroke_stripped_everywhere_not_only_root() {
        let out = normalize(
            r##"<svg viewBox="0 0 24 24"><g stroke="#000"><path stroke="blue" fill="green" d="M1 1"/></g></svg>"##,
            224,
        )
        .unwrap();
        assert!(!out.contains("stroke="));
        assert!(!out.contains("fill="));
        assert!(out.contains(r#"d="M1 1""#));
    }

    #[test]
    fn test_hyphenated_attributes_survive() {
        let out = normalize(
            r#"<svg viewBox="0 0 24 24"><path fill-rule="evenodd" stroke-width="2" fill="red"/></svg>"#,
            224,
        )
        .unwrap();
        assert!(out.contains(r#"fill-rule="evenodd""#));
        assert!(out.contains(r#"stroke-width="2""#));
        assert!(!out.contains(r#"fill="red""#));
    }

    #[test]
    fn test_idempotence() {
        let inputs = [
            r#"<svg viewBox="0 0 16 16"><path fill="red"/></svg>"#,
            r#"<svg width="48" height="48"></svg>"#,
            "<svg></svg>",
            r#"<svg class="x" width="10.5" height="20"><circle stroke="red"/></svg>"#,
        ];
        for (n, input) in [(224u32, inputs[0]), (100, inputs[1]), (37, inputs[2]), (224, inputs[3])] {
            let once = normalize(input, n).unwrap();
            let twice = normalize(&once, n).unwrap();
            assert_eq!(once, twice, "normalize must be idempotent for {input}");
        }
    }

    #[test]
    fn test_stroke_width_on_root_is_not_a_width() {
        let out = normalize_default(r#"<svg stroke-width="2" height="30"></svg>"#).unwrap();
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
    }

    #[test]
    fn test_non_svg_input_passes_through_with_strip() {
        let out = normalize(r#"<div fill="red">hello</div>"#, 224).unwrap();
        assert_eq!(out, "<div>hello</div>");
    }

    #[test]
    fn test_fractional_dimensions_formatted_like_source() {
        let out = normalize_default(r#"<svg width="10.5" height="20"></svg>"#).unwrap();
        assert!(out.contains(r#"viewBox="0 0 10.5 20""#));
    }
}
