//! Compile-time icon catalog
//!
//! The design-system icon set is embedded into the binary so the static
//! markup renderer needs no filesystem or network access at render time.
//! The preview page fetches the same sources over `GET /icons/:name`.

use rust_embed::RustEmbed;

/// Embedded icon SVG sources
#[derive(RustEmbed)]
#[folder = "icons/"]
#[include = "*.svg"]
struct EmbeddedIcons;

/// Read-only view over the embedded icon set, keyed by icon name
/// (file stem, e.g. `user` for `icons/user.svg`).
pub struct IconCatalog;

impl IconCatalog {
    /// Get the raw SVG source for an icon, or `None` if unknown.
    pub fn get(name: &str) -> Option<String> {
        // Icon names come straight off the wire; path separators would let a
        // name escape the flat catalog namespace.
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return None;
        }
        EmbeddedIcons::get(&format!("{name}.svg"))
            .map(|f| String::from_utf8_lossy(&f.data).into_owned())
    }

    /// Whether the catalog contains an icon with this name.
    pub fn contains(name: &str) -> bool {
        Self::get(name).is_some()
    }

    /// All icon names in the catalog, sorted.
    pub fn list() -> Vec<String> {
        let mut names: Vec<String> = EmbeddedIcons::iter()
            .filter_map(|path| path.strip_suffix(".svg").map(|s| s.to_string()))
            .collect();
        names.sort();
        names
    }
}
