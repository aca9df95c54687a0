use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body returned for every rejected request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short error description
    pub error: String,
    /// Additional detail, present for upstream and validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reasons a presented grant is rejected by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("URL has expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,
}

/// Failures talking to the third-party screenshot API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Screenshot request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Screenshot request failed: {0}")]
    Failed(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SIGNING_SECRET is not set; refusing to start without a signing secret")]
    MissingSecret,

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ApiError::Verification(VerificationError::InvalidSignature) => {
                (StatusCode::FORBIDDEN, self.to_string(), None)
            }
            ApiError::Verification(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ApiError::Upstream(UpstreamError::Timeout(_)) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Screenshot capture timed out".to_string(),
                Some("The screenshot service took too long to respond. Please try again later.".to_string()),
            ),
            ApiError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch screenshot".to_string(),
                Some(e.to_string()),
            ),
            ApiError::InvalidUrl(reason) => (
                StatusCode::BAD_REQUEST,
                "Invalid URL".to_string(),
                Some(reason.clone()),
            ),
            ApiError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                Some(reason.clone()),
            ),
            ApiError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
                Some(self.to_string()),
            ),
            ApiError::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(reason.clone()),
            ),
        };

        let mut response = (status, Json(ErrorResponse { error, message })).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
