//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use luminaweb::models::AppConfig;
use luminaweb::server::{build_router, create_app_state, create_app_state_with_provider, AppState};
use luminaweb::services::{GrantSigner, ScreenshotCache, ScreenshotProvider};

use super::fixtures;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub signer: Arc<GrantSigner>,
    pub screenshot_cache: Arc<ScreenshotCache>,
}

impl TestApp {
    /// Create a test application talking to a mock screenshot API
    pub fn new(api_base: &str) -> Self {
        Self::with_config(&fixtures::config_for(api_base))
    }

    /// Create a test application from an explicit configuration
    pub fn with_config(config: &AppConfig) -> Self {
        let state = create_app_state(config).expect("Failed to create app state");
        Self::from_state(state)
    }

    /// Create a test application with a custom screenshot provider
    pub fn with_provider(config: &AppConfig, provider: Arc<dyn ScreenshotProvider>) -> Self {
        let state =
            create_app_state_with_provider(config, provider).expect("Failed to create app state");
        Self::from_state(state)
    }

    fn from_state(state: AppState) -> Self {
        // Keep references for test assertions
        let signer = state.signer.clone();
        let screenshot_cache = state.screenshot_cache.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self {
            router,
            signer,
            screenshot_cache,
        }
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(
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

    /// Request a capture of `url` from the given client address
    pub async fn capture_from(&self, client_ip: &str, url: &str) -> TestResponse {
        self.post_json(
            "/api/screenshot",
            &[("X-Forwarded-For", client_ip)],
            &fixtures::capture_body(url),
        )
        .await
    }

    /// Request a capture and return the signed proxy path
    pub async fn capture(&self, url: &str) -> String {
        let response = self.capture_from("203.0.113.1", url).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let json: serde_json::Value = response.json();
        assert_eq!(json["success"], true);
        json["screenshotUrl"]
            .as_str()
            .expect("screenshotUrl should be a string")
            .to_string()
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

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response body starts with the PNG signature
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
