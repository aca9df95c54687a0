use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default path of the image proxy endpoint
pub const PROXY_PATH: &str = "/proxy";

/// Characters left untouched when a target URL is placed in a query string
/// (RFC 3986 unreserved set).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A signed, expiring authorization to fetch one screenshot through the proxy.
///
/// Grants are never stored server-side: validity is recomputed from the three
/// fields plus the signing secret, so a leaked grant stays usable until it
/// expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignedGrant {
    /// Absolute http/https URL the grant authorizes fetching
    pub target_url: String,
    /// Unix timestamp (seconds); valid while `now <= expires_at`
    pub expires_at: i64,
    /// Lowercase hex HMAC-SHA256 over the URL and expiry
    pub signature: String,
}

impl SignedGrant {
    /// Whether the grant has lapsed at `now` (inclusive boundary).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Render the grant as a proxy-facing path with query parameters.
    pub fn proxy_path(&self, base: &str) -> String {
        format!(
            "{base}?url={}&expires={}&signature={}",
            utf8_percent_encode(&self.target_url, QUERY_VALUE),
            self.expires_at,
            self.signature
        )
    }
}
