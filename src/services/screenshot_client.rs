use async_trait::async_trait;
use axum::body::Bytes;
use std::time::Duration;

use crate::error::UpstreamError;
use crate::models::ScreenshotApiConfig;

/// Source of screenshot images for a target URL
#[async_trait]
pub trait ScreenshotProvider: Send + Sync {
    /// Capture `target_url` and return the PNG bytes
    async fn capture(&self, target_url: &str) -> Result<Bytes, UpstreamError>;
}

/// Screenshot provider backed by a third-party HTTP capture API.
///
/// The API key is only ever sent upstream as a query parameter; it never
/// appears in errors or logs.
pub struct HttpScreenshotClient {
    client: reqwest::Client,
    settings: ScreenshotApiConfig,
}

impl HttpScreenshotClient {
    pub fn new(settings: ScreenshotApiConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("luminaweb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Failed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    async fn fetch(&self, target_url: &str) -> Result<Bytes, UpstreamError> {
        let query = [
            ("access_key", self.settings.api_key.clone()),
            ("url", target_url.to_string()),
            ("format", "png".to_string()),
            ("viewport_width", self.settings.viewport_width.to_string()),
            ("viewport_height", self.settings.viewport_height.to_string()),
            ("full_page", self.settings.full_page.to_string()),
        ];

        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Failed(format!(
                "Screenshot API returned HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if bytes.is_empty() {
            return Err(UpstreamError::Failed(
                "Screenshot API returned an empty body".to_string(),
            ));
        }

        Ok(bytes)
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.settings.timeout_secs)
        } else {
            // Strip the request URL, it carries the access key
            UpstreamError::Failed(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl ScreenshotProvider for HttpScreenshotClient {
    async fn capture(&self, target_url: &str) -> Result<Bytes, UpstreamError> {
        let bound = Duration::from_secs(self.settings.timeout_secs);

        let result = tokio::time::timeout(bound, self.fetch(target_url))
            .await
            .unwrap_or(Err(UpstreamError::Timeout(self.settings.timeout_secs)));

        match &result {
            Ok(bytes) => tracing::debug!(
                target_url = %target_url,
                size_bytes = bytes.len(),
                "Screenshot captured"
            ),
            Err(e) => tracing::warn!(target_url = %target_url, error = %e, "Screenshot capture failed"),
        }

        result
    }
}
