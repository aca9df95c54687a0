use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorResponse};
use crate::services::{GrantSigner, ScreenshotCache, ScreenshotProvider};

/// Cache lifetime advertised to clients for proxied images
pub const PROXY_CACHE_CONTROL: &str = "public, max-age=3600";

/// Query parameters carrying a signed grant
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProxyQuery {
    /// Target URL the grant was issued for
    pub url: Option<String>,
    /// Expiry as Unix seconds
    pub expires: Option<String>,
    /// Hex HMAC-SHA256 signature
    pub signature: Option<String>,
}

/// Fetch a screenshot through a signed URL
///
/// Verifies the grant and streams the screenshot back without exposing the
/// upstream API key.
#[utoipa::path(
    get,
    path = "/proxy",
    params(ProxyQuery),
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 400, description = "Missing parameters, malformed query or expired URL", body = ErrorResponse),
        (status = 403, description = "Invalid signature", body = ErrorResponse),
        (status = 500, description = "Upstream fetch failed", body = ErrorResponse),
        (status = 504, description = "Upstream fetch timed out", body = ErrorResponse),
    ),
    tag = "Screenshots"
)]
pub async fn handle_proxy(
    State(signer): State<Arc<GrantSigner>>,
    State(provider): State<Arc<dyn ScreenshotProvider>>,
    State(cache): State<Arc<ScreenshotCache>>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed proxy query");
        ApiError::BadRequest(e.body_text())
    })?;

    if let Err(e) = signer.verify_grant(
        query.url.as_deref(),
        query.expires.as_deref(),
        query.signature.as_deref(),
    ) {
        tracing::warn!(
            target_url = query.url.as_deref().unwrap_or(""),
            expires = query.expires.as_deref().unwrap_or(""),
            error = %e,
            "Rejected proxy request"
        );
        return Err(e.into());
    }

    // verify_grant rejects a missing url, so this is always present here
    let target_url = query.url.as_deref().unwrap_or_default();

    let png_bytes = match cache.get(target_url).await {
        Some(cached) => {
            tracing::debug!(
                target_url = %target_url,
                captured_at = %cached.captured_at,
                "Serving cached screenshot"
            );
            cached.png_bytes
        }
        None => {
            let bytes = provider.capture(target_url).await?;
            cache.store(target_url, bytes.clone()).await;
            bytes
        }
    };

    tracing::info!(
        target_url = %target_url,
        size_bytes = png_bytes.len(),
        "Proxied screenshot"
    );

    Ok(png_response(png_bytes))
}

fn png_response(png_bytes: Bytes) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, PROXY_CACHE_CONTROL),
        ],
        png_bytes,
    )
        .into_response()
}
