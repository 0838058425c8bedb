//! Headless render session.
//!
//! One Chromium process serves the whole service lifetime; every render call
//! gets its own short-lived page against the locally served preview bundle.
//! Pages, not the browser, are the unit of failure: a broken page is closed
//! and reported per-call while the browser keeps serving siblings.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use headless_chrome::browser::tab::element::Element;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::error::RenderError;
use crate::models::{AppConfig, ComponentKind, SizeToken};
use crate::services::PreviewBundle;

/// Selector for the marker class the preview bundle puts on the token
/// wrapper element.
const TOKEN_WRAPPER_SELECTOR: &str = ".token-preview";

/// An SVG with no token wrapper ancestor. Token rendering embeds an icon-like
/// SVG inside its wrapper; icon selection must not pick that one up.
const UNWRAPPED_SVG_SELECTOR: &str = "svg:not(.token-preview svg)";

/// Poll interval of the bounded populated-`<svg>` wait.
const ELEMENT_POLL: Duration = Duration::from_millis(250);

/// How the target element is located for each component kind.
struct SelectionStrategy {
    primary: &'static str,
    fallback: &'static str,
}

fn selection_for(kind: ComponentKind) -> SelectionStrategy {
    match kind {
        ComponentKind::Token => SelectionStrategy {
            primary: TOKEN_WRAPPER_SELECTOR,
            fallback: "div:has(> svg)",
        },
        ComponentKind::Icon => SelectionStrategy {
            primary: UNWRAPPED_SVG_SELECTOR,
            fallback: "svg",
        },
    }
}

/// Long-lived headless browser shared by all render calls.
///
/// The browser launches lazily on the first render and is reused until the
/// process exits; the double-checked `OnceLock` + launch mutex guarantees at
/// most one launch even under concurrent first calls. Dropping the session
/// (end of `serve`, after the shutdown signal) terminates the Chromium child.
pub struct BrowserSession {
    browser: OnceLock<Browser>,
    launch_lock: Mutex<()>,
    preview: Arc<PreviewBundle>,
    base_url: String,
    element_timeout: Duration,
}

impl BrowserSession {
    pub fn new(config: &AppConfig, preview: Arc<PreviewBundle>) -> Self {
        Self {
            browser: OnceLock::new(),
            launch_lock: Mutex::new(()),
            preview,
            base_url: config.public_base_url.clone(),
            element_timeout: config.element_timeout,
        }
    }

    /// Screenshot the named component as base64 PNG.
    pub async fn render_image(
        self: &Arc<Self>,
        icon: String,
        kind: ComponentKind,
        size: SizeToken,
    ) -> Result<String, RenderError> {
        let session = Arc::clone(self);
        tokio::task::spawn_blocking(move || session.render_image_blocking(&icon, kind, size))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    /// Serialize the named component's outer HTML.
    pub async fn render_markup(
        self: &Arc<Self>,
        icon: String,
        kind: ComponentKind,
        size: SizeToken,
    ) -> Result<String, RenderError> {
        let session = Arc::clone(self);
        tokio::task::spawn_blocking(move || session.render_markup_blocking(&icon, kind, size))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    pub fn render_image_blocking(
        &self,
        icon: &str,
        kind: ComponentKind,
        size: SizeToken,
    ) -> Result<String, RenderError> {
        self.render_on_page(icon, kind, size, |element| {
            let png = element
                .capture_screenshot(Page::CaptureScreenshotFormatOption::Png)
                .map_err(|e| RenderError::Screenshot(e.to_string()))?;
            if png.is_empty() {
                return Err(RenderError::EmptyScreenshot);
            }
            Ok(BASE64.encode(&png))
        })
    }

    pub fn render_markup_blocking(
        &self,
        icon: &str,
        kind: ComponentKind,
        size: SizeToken,
    ) -> Result<String, RenderError> {
        self.render_on_page(icon, kind, size, |element| {
            element
                .get_content()
                .map_err(|e| RenderError::Markup(e.to_string()))
        })
    }

    /// Open a page, navigate to the preview URL, resolve the target element,
    /// run `capture` on it, and close the page on every exit path.
    fn render_on_page<T>(
        &self,
        icon: &str,
        kind: ComponentKind,
        size: SizeToken,
        capture: impl FnOnce(&Element<'_>) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        // Fail fast before any browser work when the bundle is not built.
        self.preview.ensure_available()?;
        let browser = self.browser()?;

        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Page(e.to_string()))?;

        let result = (|| {
            let url = self.preview_url(icon, kind, size);
            tracing::debug!(%url, %kind, %size, "Navigating preview page");

            tab.navigate_to(&url)
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
            tab.wait_until_navigated()
                .map_err(|e| RenderError::Navigation(e.to_string()))?;

            self.wait_for_populated_svg(&tab, icon);

            let strategy = selection_for(kind);
            let element = tab
                .find_element(strategy.primary)
                .or_else(|_| tab.find_element(strategy.fallback))
                .map_err(|_| RenderError::ElementNotFound {
                    kind,
                    icon: icon.to_string(),
                })?;

            capture(&element)
        })();

        close_page(&tab);
        result
    }

    /// Bounded wait for an `<svg>` with non-empty inner content. A timeout is
    /// only a warning; rendering proceeds best-effort and the element lookup
    /// decides the final outcome.
    fn wait_for_populated_svg(&self, tab: &Arc<Tab>, icon: &str) {
        const POPULATED: &str = "(() => { const s = document.querySelector('svg'); \
             return !!(s && s.innerHTML.trim().length > 0); })()";

        let deadline = Instant::now() + self.element_timeout;
        loop {
            let ready = tab
                .evaluate(POPULATED, false)
                .ok()
                .and_then(|r| r.value)
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if ready {
                return;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    icon,
                    timeout_secs = self.element_timeout.as_secs(),
                    "Timed out waiting for populated svg, proceeding anyway"
                );
                return;
            }
            std::thread::sleep(ELEMENT_POLL);
        }
    }

    fn preview_url(&self, icon: &str, kind: ComponentKind, size: SizeToken) -> String {
        format!(
            "{}/?iconType={}&componentType={}&size={}",
            self.base_url,
            utf8_percent_encode(icon, NON_ALPHANUMERIC),
            kind,
            size,
        )
    }

    /// Lazy single launch: double-checked so concurrent first calls cannot
    /// start a second Chromium process.
    fn browser(&self) -> Result<&Browser, RenderError> {
        if let Some(browser) = self.browser.get() {
            return Ok(browser);
        }

        let _guard = self.launch_lock.lock().unwrap();
        if let Some(browser) = self.browser.get() {
            return Ok(browser);
        }

        tracing::info!("Launching headless browser");
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1280, 800)))
            // the managed container platform provides no sandbox user namespace
            .sandbox(false)
            .build()
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;
        let browser =
            Browser::new(options).map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let _ = self.browser.set(browser);
        self.browser
            .get()
            .ok_or_else(|| RenderError::BrowserLaunch("browser slot empty after launch".into()))
    }
}

/// Cleanup never throws: a failed close is logged and discarded so it cannot
/// mask the primary render result.
fn close_page(tab: &Arc<Tab>) {
    if let Err(e) = tab.close(false) {
        tracing::debug!(%e, "Best-effort page close failed");
    }
}
