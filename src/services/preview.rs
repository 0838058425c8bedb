//! Preview bundle location and serving.
//!
//! The headless session renders against a prebuilt static page served at the
//! service root. The bundle lives on disk (it is produced by a separate
//! build); when it is absent every headless render fails fast with a
//! descriptive error instead of navigating into a 404.

use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// Prebuilt static preview page, served at `GET /` and self-navigated to by
/// the headless browser.
pub struct PreviewBundle {
    dir: PathBuf,
}

impl PreviewBundle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !dir.join("index.html").is_file() {
            tracing::warn!(
                dir = %dir.display(),
                "Preview bundle not found; headless rendering will fail until it is built"
            );
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the bundle's entry point exists right now.
    pub fn is_available(&self) -> bool {
        self.dir.join("index.html").is_file()
    }

    /// Fail-fast guard used before any browser work.
    pub fn ensure_available(&self) -> Result<(), RenderError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(RenderError::PreviewBundleMissing(
                self.dir.display().to_string(),
            ))
        }
    }

    /// Read the bundle's entry point. Checked on every request so a bundle
    /// built after startup is picked up without a restart.
    pub fn index_html(&self) -> Option<String> {
        std::fs::read_to_string(self.dir.join("index.html")).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bundle_is_unavailable() {
        let bundle = PreviewBundle::new("/nonexistent/preview/dist");
        assert!(!bundle.is_available());
        assert!(bundle.index_html().is_none());
        let err = bundle.ensure_available().unwrap_err();
        assert!(err.to_string().contains("preview bundle not found"));
    }

    #[test]
    fn test_present_bundle_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<!doctype html><html></html>").unwrap();

        let bundle = PreviewBundle::new(dir.path());
        assert!(bundle.is_available());
        assert!(bundle.ensure_available().is_ok());
        assert!(bundle.index_html().unwrap().contains("<!doctype html>"));
    }
}
