use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ComponentKind;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid componentType '{0}': expected \"icon\" or \"token\"")]
    InvalidComponentKind(String),

    #[error("Invalid size '{0}': expected one of s, m, l, xl")]
    InvalidSize(String),

    #[error("Invalid request: {0}")]
    InvalidBatch(&'static str),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64, limit: u32 },

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("preview bundle not found at '{0}'; build the preview app before rendering")]
    PreviewBundleMissing(String),

    #[error("failed to launch headless browser: {0}")]
    BrowserLaunch(String),

    #[error("page setup failed: {0}")]
    Page(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("no renderable {kind} element found for '{icon}'")]
    ElementNotFound { kind: ComponentKind, icon: String },

    #[error("screenshot capture failed: {0}")]
    Screenshot(String),

    #[error("screenshot produced no data")]
    EmptyScreenshot,

    #[error("markup capture failed: {0}")]
    Markup(String),

    #[error("unknown icon '{0}'")]
    UnknownIcon(String),

    #[error("render task failed: {0}")]
    Task(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingField(_)
            | ApiError::InvalidComponentKind(_)
            | ApiError::InvalidSize(_)
            | ApiError::InvalidBatch(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::Render(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        let mut response = (status, body).into_response();

        // Over-cap responses carry the standard retry headers so clients can
        // back off without parsing the body.
        if let ApiError::RateLimited {
            retry_after_secs,
            limit,
        } = &self
        {
            let headers = response.headers_mut();
            if let Ok(v) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                headers.insert(header::RETRY_AFTER, v);
            }
            if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
                headers.insert("X-RateLimit-Limit", v);
            }
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        }

        response
    }
}
