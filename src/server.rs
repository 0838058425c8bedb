//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::assets::IconCatalog;
use crate::models::AppConfig;
use crate::rendering::StaticRenderer;
use crate::services::{rate_limit_middleware, BrowserSession, PreviewBundle, RateLimiter};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<BrowserSession>,
    pub static_renderer: Arc<StaticRenderer>,
    pub preview: Arc<PreviewBundle>,
    pub limiter: Arc<RateLimiter>,
}

/// Create application state from a config.
pub fn create_app_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let preview = Arc::new(PreviewBundle::new(config.preview_dir.clone()));
    let session = Arc::new(BrowserSession::new(&config, preview.clone()));
    let static_renderer = Arc::new(
        StaticRenderer::new().map_err(|e| anyhow::anyhow!("Failed to load component template: {e}"))?,
    );
    let limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute));

    Ok(AppState {
        config,
        session,
        static_renderer,
        preview,
        limiter,
    })
}

/// Build the API router with all endpoints and middleware.
///
/// The render endpoints share the per-client rate limiter; the health check
/// and the preview/icon GETs are deliberately outside it.
pub fn build_router(state: AppState) -> Router {
    let render_routes = Router::new()
        .route("/render-icon", post(api::handle_render_icon))
        .route("/render-svg", post(api::handle_render_svg))
        .route("/render-token", post(api::handle_render_token))
        .route("/render-markup", post(api::handle_render_markup))
        .route("/render-icons", post(api::handle_render_icons))
        .route("/render-tokens", post(api::handle_render_tokens))
        .route("/render-markups", post(api::handle_render_markups))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(api::handle_health))
        .route("/", get(handle_preview_index))
        .route("/icons/:name", get(handle_icon_source))
        .merge(render_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the prebuilt preview bundle's entry point.
async fn handle_preview_index(State(state): State<AppState>) -> Response {
    match state.preview.index_html() {
        Some(html) => Html(html).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "Preview bundle not built. Build the preview app and set PREVIEW_DIR.",
        )
            .into_response(),
    }
}

/// Serve an embedded icon's SVG source; the preview page fetches these.
async fn handle_icon_source(Path(name): Path<String>) -> Response {
    match IconCatalog::get(&name) {
        Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown icon '{name}'")).into_response(),
    }
}
