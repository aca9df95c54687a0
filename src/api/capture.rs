use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Json,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::headers::HeaderMapExt;
use crate::error::{ApiError, ErrorResponse};
use crate::models::PROXY_PATH;
use crate::services::{
    GrantSigner, RateDecision, RateLimiter, ScreenshotCache, ScreenshotProvider,
};

/// Request body for the capture endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct CaptureRequest {
    /// Absolute http(s) URL of the page to capture
    pub url: String,
}

/// Response from a successful capture
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    /// Signed proxy path the client uses to fetch the image
    pub screenshot_url: String,
}

/// Capture a screenshot of a website
///
/// Calls the upstream screenshot API and returns a signed, expiring proxy URL
/// for the resulting image. The upstream API key is never exposed.
#[utoipa::path(
    post,
    path = "/api/screenshot",
    request_body = CaptureRequest,
    responses(
        (status = 200, description = "Screenshot captured", body = CaptureResponse),
        (status = 400, description = "Invalid URL or request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream capture failed", body = ErrorResponse),
        (status = 504, description = "Upstream capture timed out", body = ErrorResponse),
    ),
    tag = "Screenshots"
)]
pub async fn handle_capture(
    State(signer): State<Arc<GrantSigner>>,
    State(provider): State<Arc<dyn ScreenshotProvider>>,
    State(cache): State<Arc<ScreenshotCache>>,
    State(rate_limiter): State<Arc<RateLimiter>>,
    headers: HeaderMap,
    body: Result<Json<CaptureRequest>, JsonRejection>,
) -> Result<Json<CaptureResponse>, ApiError> {
    let client = headers.client_ip();

    if let RateDecision::Limited { retry_after } = rate_limiter.check(&client) {
        tracing::warn!(client = %client, "Capture rate limit exceeded");
        return Err(ApiError::RateLimited {
            retry_after_secs: retry_after.as_secs().max(1),
        });
    }

    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let target_url = validate_target_url(&request.url)?;

    tracing::info!(client = %client, target_url = %target_url, "Capture request received");

    let png_bytes = provider.capture(target_url).await?;
    cache.store(target_url, png_bytes).await;

    let grant = signer.issue_grant(target_url);

    tracing::info!(
        target_url = %target_url,
        expires_at = grant.expires_at,
        "Issued screenshot grant"
    );

    Ok(Json(CaptureResponse {
        success: true,
        screenshot_url: grant.proxy_path(PROXY_PATH),
    }))
}

/// Accept only absolute http/https URLs with a host.
pub fn validate_target_url(raw: &str) -> Result<&str, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{other}', expected http or https"
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::InvalidUrl("URL has no host".to_string()));
    }

    Ok(trimmed)
}
