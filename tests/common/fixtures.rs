//! Test fixtures and constants.

use luminaweb::models::AppConfig;

/// Signing secret used by test apps
pub const SECRET: &str = "test-signing-secret-0123456789abcdef";

/// Access key the mock screenshot API expects
pub const API_KEY: &str = "test-api-key";

/// Path of the mock upstream capture endpoint
pub const CAPTURE_PATH: &str = "/take";

/// Target page used in most tests
pub const TARGET_URL: &str = "https://example.com";

/// Bytes standing in for a captured screenshot
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR fake screenshot payload";

/// Configuration pointing at a mock screenshot API
pub fn config_for(api_base: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.signing_secret = Some(SECRET.to_string());
    config.screenshot.api_url = format!("{api_base}{CAPTURE_PATH}");
    config.screenshot.api_key = API_KEY.to_string();
    config.screenshot.timeout_secs = 2;
    config
}

/// JSON body for the capture endpoint
pub fn capture_body(url: &str) -> String {
    serde_json::json!({ "url": url }).to_string()
}

/// Grant fields extracted from a signed proxy path
#[derive(Debug, Clone)]
pub struct ProxyParams {
    pub url: String,
    pub expires: String,
    pub signature: String,
}

impl ProxyParams {
    /// Build a proxy path from (possibly tampered) fields
    pub fn to_path(&self) -> String {
        let mut url = reqwest::Url::parse("http://localhost/proxy").unwrap();
        url.query_pairs_mut()
            .append_pair("url", &self.url)
            .append_pair("expires", &self.expires)
            .append_pair("signature", &self.signature);
        format!("/proxy?{}", url.query().unwrap())
    }
}

/// Split a `/proxy?url=..&expires=..&signature=..` path into its fields
pub fn parse_proxy_path(path: &str) -> ProxyParams {
    let url = reqwest::Url::parse(&format!("http://localhost{path}")).unwrap();
    assert_eq!(url.path(), "/proxy");

    let get = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| panic!("missing {name} in {path}"))
    };

    ProxyParams {
        url: get("url"),
        expires: get("expires"),
        signature: get("signature"),
    }
}
