//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

use glyphsnap::models::AppConfig;
use glyphsnap::server::{build_router, create_app_state};

/// Test application wrapping the production router.
pub struct TestApp {
    router: axum::Router,
}

impl TestApp {
    /// App with no preview bundle on disk and a cap high enough that rate
    /// limiting never interferes with validation tests.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// App whose preview bundle lives in the given directory.
    pub fn with_preview_dir(dir: &Path) -> Self {
        let mut config = test_config();
        config.preview_dir = dir.to_path_buf();
        Self::with_config(config)
    }

    /// App with a specific per-minute render cap.
    pub fn with_rate_limit(cap: u32) -> Self {
        let mut config = test_config();
        config.rate_limit_per_minute = cap;
        Self::with_config(config)
    }

    fn with_config(config: AppConfig) -> Self {
        let state = create_app_state(Arc::new(config)).expect("Failed to create app state");
        Self {
            router: build_router(state),
        }
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        self.post_json_with_headers(path, &[], body).await
    }

    /// Make a POST request with JSON body and custom headers
    pub async fn post_json_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::post(path).header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        preview_dir: "/nonexistent/glyphsnap-preview".into(),
        rate_limit_per_minute: 1000,
        ..AppConfig::default()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
