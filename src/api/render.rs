//! Single-render endpoints.
//!
//! Validation happens here, before any rendering work: a missing or invalid
//! field is a 400 with no page opened and no browser launched. Render
//! failures surface as 500s with a descriptive `error` string.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{ComponentKind, SizeToken};
use crate::rendering::normalize_default;
use crate::server::AppState;

/// Request body for the headless single-render endpoints.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Icon identifier, e.g. `user`
    #[serde(default)]
    pub icon_name: Option<String>,
    /// `icon` or `token`; required on headless endpoints
    #[serde(default)]
    pub component_type: Option<String>,
    /// Size token (s, m, l, xl); defaults to `m`
    #[serde(default)]
    pub size: Option<String>,
}

/// Screenshot response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderIconResponse {
    /// Base64-encoded PNG of the rendered component
    pub image: String,
    pub icon_name: String,
    pub component_type: ComponentKind,
    pub size: SizeToken,
}

/// Markup response (headless path)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderSvgResponse {
    /// Outer HTML of the rendered component
    pub svg_content: String,
    pub icon_name: String,
    pub component_type: ComponentKind,
    pub size: SizeToken,
}

/// Legacy token-only screenshot response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderTokenResponse {
    pub image: String,
    pub icon_name: String,
    pub size: SizeToken,
}

/// Static-path markup response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderMarkupResponse {
    /// Normalized SVG markup of the icon component
    pub svg_content: String,
    pub icon_name: String,
    pub size: SizeToken,
}

/// Pull a non-empty icon identifier out of a request.
pub(crate) fn require_icon_name(value: Option<&String>) -> Result<String, ApiError> {
    match value {
        Some(name) if !name.trim().is_empty() => Ok(name.clone()),
        _ => Err(ApiError::MissingField("iconName")),
    }
}

/// componentType is required on the headless endpoints and accepts exactly
/// the two enum values; absence is a client error, never a silent default.
pub(crate) fn require_component_kind(value: Option<&String>) -> Result<ComponentKind, ApiError> {
    match value {
        None => Err(ApiError::MissingField("componentType")),
        Some(raw) => {
            ComponentKind::parse(raw).ok_or_else(|| ApiError::InvalidComponentKind(raw.clone()))
        }
    }
}

pub(crate) fn parse_size(value: Option<&String>, default: SizeToken) -> Result<SizeToken, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => SizeToken::parse(raw).ok_or_else(|| ApiError::InvalidSize(raw.clone())),
    }
}

/// Render a component to a PNG screenshot
#[utoipa::path(
    post,
    path = "/render-icon",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Component captured", body = RenderIconResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Render failure"),
    ),
    tag = "Render"
)]
pub async fn handle_render_icon(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderIconResponse>, ApiError> {
    let icon_name = require_icon_name(request.icon_name.as_ref())?;
    let component_type = require_component_kind(request.component_type.as_ref())?;
    let size = parse_size(request.size.as_ref(), SizeToken::M)?;

    let image = state
        .session
        .render_image(icon_name.clone(), component_type, size)
        .await?;

    tracing::info!(icon = %icon_name, kind = %component_type, %size, "Rendered component image");

    Ok(Json(RenderIconResponse {
        image,
        icon_name,
        component_type,
        size,
    }))
}

/// Render a component and return its live markup
#[utoipa::path(
    post,
    path = "/render-svg",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Component serialized", body = RenderSvgResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Render failure"),
    ),
    tag = "Render"
)]
pub async fn handle_render_svg(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderSvgResponse>, ApiError> {
    let icon_name = require_icon_name(request.icon_name.as_ref())?;
    let component_type = require_component_kind(request.component_type.as_ref())?;
    let size = parse_size(request.size.as_ref(), SizeToken::M)?;

    let svg_content = state
        .session
        .render_markup(icon_name.clone(), component_type, size)
        .await?;

    Ok(Json(RenderSvgResponse {
        svg_content,
        icon_name,
        component_type,
        size,
    }))
}

/// Render a token to a PNG screenshot (legacy alias, componentType implied)
#[utoipa::path(
    post,
    path = "/render-token",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Token captured", body = RenderTokenResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Render failure"),
    ),
    tag = "Render"
)]
pub async fn handle_render_token(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderTokenResponse>, ApiError> {
    let icon_name = require_icon_name(request.icon_name.as_ref())?;
    let size = parse_size(request.size.as_ref(), SizeToken::M)?;

    let image = state
        .session
        .render_image(icon_name.clone(), ComponentKind::Token, size)
        .await?;

    Ok(Json(RenderTokenResponse {
        image,
        icon_name,
        size,
    }))
}

/// Render an icon without a browser and return normalized SVG (fast path)
#[utoipa::path(
    post,
    path = "/render-markup",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Icon rendered", body = RenderMarkupResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Unknown icon"),
    ),
    tag = "Render"
)]
pub async fn handle_render_markup(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderMarkupResponse>, ApiError> {
    let icon_name = require_icon_name(request.icon_name.as_ref())?;
    let size = parse_size(request.size.as_ref(), SizeToken::Xl)?;

    let svg_content = state
        .static_renderer
        .render_to_svg(&icon_name, size)
        .and_then(|svg| normalize_default(&svg))
        .ok_or_else(|| crate::error::RenderError::UnknownIcon(icon_name.clone()))?;

    Ok(Json(RenderMarkupResponse {
        svg_content,
        icon_name,
        size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_icon_name() {
        assert_eq!(
            require_icon_name(Some(&"user".to_string())).unwrap(),
            "user"
        );
        assert!(matches!(
            require_icon_name(None),
            Err(ApiError::MissingField("iconName"))
        ));
        assert!(matches!(
            require_icon_name(Some(&"  ".to_string())),
            Err(ApiError::MissingField("iconName"))
        ));
    }

    #[test]
    fn test_require_component_kind() {
        assert_eq!(
            require_component_kind(Some(&"icon".to_string())).unwrap(),
            ComponentKind::Icon
        );
        assert!(matches!(
            require_component_kind(None),
            Err(ApiError::MissingField("componentType"))
        ));
        assert!(matches!(
            require_component_kind(Some(&"badge".to_string())),
            Err(ApiError::InvalidComponentKind(_))
        ));
    }

    #[test]
    fn test_parse_size_defaults_only_when_absent() {
        assert_eq!(parse_size(None, SizeToken::M).unwrap(), SizeToken::M);
        assert_eq!(
            parse_size(Some(&"xl".to_string()), SizeToken::M).unwrap(),
            SizeToken::Xl
        );
        assert!(matches!(
            parse_size(Some(&"huge".to_string()), SizeToken::M),
            Err(ApiError::InvalidSize(_))
        ));
    }
}
