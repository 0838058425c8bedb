//! Static (browser-free) component rendering.
//!
//! The fast path: instantiate the icon component as markup from the embedded
//! catalog through a Tera template, then pull the first `<svg>` element out of
//! the result. Used when the component renders fully server-side; the headless
//! session covers the cases that need a real DOM.

use scraper::{Html, Selector};
use tera::{Context, Tera};

use crate::assets::IconCatalog;
use crate::models::SizeToken;

const COMPONENT_TEMPLATE: &str = include_str!("../../templates/icon_component.html.tera");
const COMPONENT_TEMPLATE_NAME: &str = "icon_component.html";

/// Renders named icon components to SVG strings without a browser.
pub struct StaticRenderer {
    tera: Tera,
}

impl StaticRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(COMPONENT_TEMPLATE_NAME, COMPONENT_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Render the named icon component and extract its SVG markup.
    ///
    /// Returns `None` on unknown icons or template failures (with a logged
    /// diagnostic) - rendering problems never propagate to callers as panics
    /// or errors. No filesystem or network access.
    pub fn render_to_svg(&self, icon: &str, size: SizeToken) -> Option<String> {
        let source = match IconCatalog::get(icon) {
            Some(s) => s,
            None => {
                tracing::warn!(icon, "Static render requested for unknown icon");
                return None;
            }
        };

        let mut context = Context::new();
        context.insert("icon_name", icon);
        context.insert("icon_svg", &source);
        context.insert("size", &size.to_string());
        context.insert("size_px", &size.px());

        match self.tera.render(COMPONENT_TEMPLATE_NAME, &context) {
            Ok(markup) => Some(extract_svg(&markup)),
            Err(e) => {
                tracing::warn!(icon, %e, "Component template render failed");
                None
            }
        }
    }
}

/// Extract the first `<svg>` element from rendered markup via a shallow HTML
/// parse. Falls back to returning the input unchanged when no `<svg>` element
/// is present - callers must tolerate non-SVG-wrapped output in that case.
pub fn extract_svg(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let selector = match Selector::parse("svg") {
        Ok(s) => s,
        Err(_) => return markup.to_string(),
    };

    fragment
        .select(&selector)
        .next()
        .map(|el| el.html())
        .unwrap_or_else(|| markup.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_icon_renders_single_svg() {
        let renderer = StaticRenderer::new().unwrap();
        let svg = renderer.render_to_svg("user", SizeToken::Xl).unwrap();
        assert_eq!(svg.matches("<svg").count(), 1);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_unknown_icon_is_none_not_panic() {
        let renderer = StaticRenderer::new().unwrap();
        assert!(renderer
            .render_to_svg("definitely-not-an-icon", SizeToken::M)
            .is_none());
    }

    #[test]
    fn test_extract_svg_drops_wrapper_markup() {
        let markup = r#"<span class="gs-icon gs-icon-m"><svg viewBox="0 0 24 24"><path d="M0 0"></path></svg></span>"#;
        let svg = extract_svg(markup);
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("gs-icon"));
    }

    #[test]
    fn test_extract_svg_takes_first_of_nested() {
        let markup = "<div><svg id=\"outer\"><svg id=\"inner\"></svg></svg></div>";
        let svg = extract_svg(markup);
        assert!(svg.contains("outer"));
    }

    #[test]
    fn test_extract_svg_fallback_returns_input() {
        let markup = "<p>no vector content here</p>";
        assert_eq!(extract_svg(markup), markup);
    }
}
