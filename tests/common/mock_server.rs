//! Mock third-party screenshot API.

use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use super::fixtures::{API_KEY, CAPTURE_PATH, PNG_BYTES};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockScreenshotApi {
    pub server: MockServer,
}

impl MockScreenshotApi {
    /// Start a new mock screenshot API
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URL of the mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Respond to authorized captures of `target` with a PNG
    pub async fn mock_capture(&self, target: &str) {
        Mock::given(method("GET"))
            .and(path(CAPTURE_PATH))
            .and(query_param("access_key", API_KEY))
            .and(query_param("url", target))
            .and(query_param("format", "png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(PNG_BYTES)
                    .insert_header("content-type", "image/png"),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond to captures of `target` with an error status
    pub async fn mock_error(&self, target: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(CAPTURE_PATH))
            .and(query_param("url", target))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
            .mount(&self.server)
            .await;
    }

    /// Respond to captures of `target` only after `delay`
    pub async fn mock_slow(&self, target: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(CAPTURE_PATH))
            .and(query_param("url", target))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(PNG_BYTES)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests the mock has received
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
