//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header::X_CONTENT_TYPE_OPTIONS, HeaderMap, HeaderValue},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api::{self, CaptureRequest, CaptureResponse, ProxyQuery};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{
    GrantSigner, HttpScreenshotClient, RateLimiter, ScreenshotCache, ScreenshotProvider,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub signer: Arc<GrantSigner>,
    pub provider: Arc<dyn ScreenshotProvider>,
    pub screenshot_cache: Arc<ScreenshotCache>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Create application state talking to the configured screenshot API.
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate_for_serve()?;

    let client = HttpScreenshotClient::new(config.screenshot.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create screenshot client: {e}"))?;

    create_app_state_with_provider(config, Arc::new(client))
}

/// Create application state with an explicit screenshot provider.
///
/// Still refuses to build without a signing secret.
pub fn create_app_state_with_provider(
    config: &AppConfig,
    provider: Arc<dyn ScreenshotProvider>,
) -> anyhow::Result<AppState> {
    let signer = GrantSigner::new(config.signing_secret()?)?.with_ttl(config.grant_ttl_secs);

    let cache_ttl = Duration::from_secs(u64::try_from(config.grant_ttl_secs).unwrap_or(0));
    let screenshot_cache = ScreenshotCache::new(cache_ttl, config.cache_max_entries);

    let rate_limiter = RateLimiter::new(
        config.rate_limit.max_requests,
        Duration::from_secs(config.rate_limit.window_secs),
    );

    Ok(AppState {
        signer: Arc::new(signer),
        provider,
        screenshot_cache: Arc::new(screenshot_cache),
        rate_limiter: Arc::new(rate_limiter),
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/screenshot", post(handle_capture))
        .route("/proxy", get(handle_proxy))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_capture(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CaptureRequest>, JsonRejection>,
) -> Result<Json<CaptureResponse>, ApiError> {
    api::handle_capture(
        State(state.signer),
        State(state.provider),
        State(state.screenshot_cache),
        State(state.rate_limiter),
        headers,
        body,
    )
    .await
}

async fn handle_proxy(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    api::handle_proxy(
        State(state.signer),
        State(state.provider),
        State(state.screenshot_cache),
        query,
    )
    .await
}
