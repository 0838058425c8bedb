//! Batch-render endpoints.
//!
//! A batch is a JSON array of independent items rendered concurrently and
//! joined in input order. Item failures (bad fields, unknown icons, render
//! errors) surface as per-item `error` strings; the response is always 200.
//! Only a missing or non-array list field is a request-level 400. An empty
//! array is valid input on every batch endpoint and yields empty results.

use axum::{extract::State, response::Json};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::render::{parse_size, require_component_kind, require_icon_name};
use crate::error::ApiError;
use crate::models::{ComponentKind, SizeToken};
use crate::rendering::normalize_default;
use crate::server::AppState;

/// One entry of a batch request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchItem {
    #[serde(default)]
    icon_name: Option<String>,
    #[serde(default)]
    component_type: Option<String>,
    #[serde(default)]
    size: Option<String>,
}

/// Per-item outcome of a screenshot batch.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IconBatchResult {
    pub icon_name: String,
    pub component_type: Option<ComponentKind>,
    pub size: SizeToken,
    /// Base64 PNG, or null when this item failed
    pub image: Option<String>,
    /// Failure reason, or null when this item succeeded
    pub error: Option<String>,
}

/// Per-item outcome of the legacy token batch.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBatchResult {
    pub icon_name: String,
    pub size: SizeToken,
    pub image: Option<String>,
    pub error: Option<String>,
}

/// Per-item outcome of the static markup batch.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkupBatchResult {
    pub icon_name: String,
    pub size: SizeToken,
    pub svg_content: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderIconsResponse {
    pub results: Vec<IconBatchResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderTokensResponse {
    pub results: Vec<TokenBatchResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderMarkupsResponse {
    pub results: Vec<MarkupBatchResult>,
}

/// The list field must be present and an array; anything else is a client
/// error before any rendering starts.
fn require_items(
    body: &Value,
    field: &str,
    message: &'static str,
) -> Result<Vec<BatchItem>, ApiError> {
    match body.get(field) {
        Some(Value::Array(raw)) => Ok(raw
            .iter()
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .collect()),
        _ => Err(ApiError::InvalidBatch(message)),
    }
}

/// Screenshot a batch of components
#[utoipa::path(
    post,
    path = "/render-icons",
    responses(
        (status = 200, description = "Per-item results in input order", body = RenderIconsResponse),
        (status = 400, description = "icons is missing or not an array"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "Render"
)]
pub async fn handle_render_icons(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RenderIconsResponse>, ApiError> {
    let items = require_items(&body, "icons", "icons must be an array")?;

    let results = join_all(items.into_iter().map(|item| {
        let state = state.clone();
        async move { render_icon_item(state, item).await }
    }))
    .await;

    Ok(Json(RenderIconsResponse { results }))
}

async fn render_icon_item(state: AppState, item: BatchItem) -> IconBatchResult {
    let icon_name = item.icon_name.clone().unwrap_or_default();
    let component_type = item
        .component_type
        .as_ref()
        .and_then(|raw| ComponentKind::parse(raw));
    let size = item
        .size
        .as_ref()
        .and_then(|raw| SizeToken::parse(raw))
        .unwrap_or(SizeToken::M);

    let outcome = async {
        let name = require_icon_name(item.icon_name.as_ref())?;
        let kind = require_component_kind(item.component_type.as_ref())?;
        let size = parse_size(item.size.as_ref(), SizeToken::M)?;
        let image = state.session.render_image(name, kind, size).await?;
        Ok::<_, ApiError>(image)
    }
    .await;

    match outcome {
        Ok(image) => IconBatchResult {
            icon_name,
            component_type,
            size,
            image: Some(image),
            error: None,
        },
        Err(e) => IconBatchResult {
            icon_name,
            component_type,
            size,
            image: None,
            error: Some(e.to_string()),
        },
    }
}

/// Screenshot a batch of tokens (legacy alias, componentType implied)
#[utoipa::path(
    post,
    path = "/render-tokens",
    responses(
        (status = 200, description = "Per-item results in input order", body = RenderTokensResponse),
        (status = 400, description = "tokens is missing or not an array"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "Render"
)]
pub async fn handle_render_tokens(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RenderTokensResponse>, ApiError> {
    let items = require_items(&body, "tokens", "tokens must be an array")?;

    let results = join_all(items.into_iter().map(|item| {
        let state = state.clone();
        async move { render_token_item(state, item).await }
    }))
    .await;

    Ok(Json(RenderTokensResponse { results }))
}

async fn render_token_item(state: AppState, item: BatchItem) -> TokenBatchResult {
    let icon_name = item.icon_name.clone().unwrap_or_default();
    let size = item
        .size
        .as_ref()
        .and_then(|raw| SizeToken::parse(raw))
        .unwrap_or(SizeToken::M);

    let outcome = async {
        let name = require_icon_name(item.icon_name.as_ref())?;
        let size = parse_size(item.size.as_ref(), SizeToken::M)?;
        let image = state
            .session
            .render_image(name, ComponentKind::Token, size)
            .await?;
        Ok::<_, ApiError>(image)
    }
    .await;

    match outcome {
        Ok(image) => TokenBatchResult {
            icon_name,
            size,
            image: Some(image),
            error: None,
        },
        Err(e) => TokenBatchResult {
            icon_name,
            size,
            image: None,
            error: Some(e.to_string()),
        },
    }
}

/// Render a batch of icons without a browser (static fast path)
#[utoipa::path(
    post,
    path = "/render-markups",
    responses(
        (status = 200, description = "Per-item results in input order", body = RenderMarkupsResponse),
        (status = 400, description = "icons is missing or not an array"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "Render"
)]
pub async fn handle_render_markups(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RenderMarkupsResponse>, ApiError> {
    let items = require_items(&body, "icons", "icons must be an array")?;

    let results = items
        .into_iter()
        .map(|item| render_markup_item(&state, item))
        .collect();

    Ok(Json(RenderMarkupsResponse { results }))
}

fn render_markup_item(state: &AppState, item: BatchItem) -> MarkupBatchResult {
    let icon_name = item.icon_name.clone().unwrap_or_default();
    let size = item
        .size
        .as_ref()
        .and_then(|raw| SizeToken::parse(raw))
        .unwrap_or(SizeToken::Xl);

    let outcome = (|| {
        let name = require_icon_name(item.icon_name.as_ref())?;
        let size = parse_size(item.size.as_ref(), SizeToken::Xl)?;
        state
            .static_renderer
            .render_to_svg(&name, size)
            .and_then(|svg| normalize_default(&svg))
            .ok_or_else(|| ApiError::Render(crate::error::RenderError::UnknownIcon(name)))
    })();

    match outcome {
        Ok(svg_content) => MarkupBatchResult {
            icon_name,
            size,
            svg_content: Some(svg_content),
            error: None,
        },
        Err(e) => MarkupBatchResult {
            icon_name,
            size,
            svg_content: None,
            error: Some(e.to_string()),
        },
    }
}
