//! Header parsing utilities for API requests.

use axum::http::HeaderMap;

/// Key used for clients whose address cannot be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extension trait for convenient header parsing.
pub trait HeaderMapExt {
    /// Get a header value as a string, returning None if missing or not ASCII.
    fn get_str(&self, name: &str) -> Option<&str>;

    /// Best-effort client address for rate limiting.
    ///
    /// Uses the first hop of `X-Forwarded-For`, then `X-Real-IP`.
    fn client_ip(&self) -> String;
}

impl HeaderMapExt for HeaderMap {
    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn client_ip(&self) -> String {
        self.get_str("X-Forwarded-For")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.get_str("X-Real-IP")
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or(UNKNOWN_CLIENT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn make_headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            // HTTP header names are case-insensitive
            let header_name = HeaderName::try_from(*name).unwrap();
            headers.insert(header_name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_get_str_present() {
        let headers = make_headers(&[("x-real-ip", "10.0.0.1")]);
        assert_eq!(headers.get_str("X-Real-IP"), Some("10.0.0.1"));
    }

    #[test]
    fn test_get_str_missing() {
        let headers = HeaderMap::new();
        assert_eq!(headers.get_str("X-Real-IP"), None);
    }

    #[test]
    fn test_client_ip_forwarded_first_hop() {
        let headers = make_headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(headers.client_ip(), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_real_ip_fallback() {
        let headers = make_headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(headers.client_ip(), "198.51.100.4");
    }

    #[test]
    fn test_client_ip_empty_forwarded_falls_back() {
        let headers = make_headers(&[("x-forwarded-for", ""), ("x-real-ip", "198.51.100.4")]);
        assert_eq!(headers.client_ip(), "198.51.100.4");
    }

    #[test]
    fn test_client_ip_unknown() {
        assert_eq!(HeaderMap::new().client_ip(), UNKNOWN_CLIENT);
    }
}
