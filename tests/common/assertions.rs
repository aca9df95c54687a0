//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is a proxied PNG with the expected caching headers
pub fn assert_png(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );
    assert_eq!(
        response.header("content-type"),
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
    assert_eq!(
        response.header("cache-control"),
        Some("public, max-age=3600"),
        "Expected one hour public caching"
    );
}

/// Assert response carries the given status and `error` string
pub fn assert_error(response: &TestResponse, expected: StatusCode, error: &str) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["error"].as_str(),
        Some(error),
        "Unexpected error body: {}",
        response.text()
    );
}

/// Assert an error body also carries a `message` detail
pub fn assert_has_message(response: &TestResponse) {
    let json: serde_json::Value = response.json();
    assert!(
        json["message"].is_string(),
        "Expected message in error body: {}",
        response.text()
    );
}
