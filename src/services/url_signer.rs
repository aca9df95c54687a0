//! Signed, expiring proxy URLs for screenshot images.
//!
//! A grant binds a target URL and an expiry timestamp to a server-held secret
//! with HMAC-SHA256. Verification is stateless: anyone holding the secret can
//! recompute the MAC from the presented fields.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::error::{ConfigError, VerificationError};
use crate::models::SignedGrant;

type HmacSha256 = Hmac<Sha256>;

/// Default grant lifetime in seconds (1 hour)
pub const DEFAULT_GRANT_TTL_SECS: i64 = 3600;

/// Longest grant lifetime accepted from configuration (1 year)
pub const MAX_GRANT_TTL_SECS: i64 = 365 * 24 * 3600;

/// Length of a hex-encoded SHA-256 MAC
const SIGNATURE_HEX_LEN: usize = 64;

/// Issues and verifies screenshot grants.
#[derive(Clone)]
pub struct GrantSigner {
    /// HMAC keyed with the signing secret, cloned for every computation
    mac: HmacSha256,
    /// Grant validity in seconds
    ttl_secs: i64,
}

impl fmt::Debug for GrantSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl GrantSigner {
    /// Create a signer from a secret. Empty secrets are rejected.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Self::from_key(secret.as_bytes())
    }

    /// Create a signer keyed with 32 random bytes
    pub fn with_random_secret() -> Result<Self, ConfigError> {
        Self::from_key(&random_secret())
    }

    fn from_key(key: &[u8]) -> Result<Self, ConfigError> {
        // HMAC accepts keys of any length, so this only guards the API contract
        let mac = HmacSha256::new_from_slice(key).map_err(|_| ConfigError::InvalidValue {
            name: "SIGNING_SECRET",
            value: format!("{}-byte key", key.len()),
        })?;
        Ok(Self {
            mac,
            ttl_secs: DEFAULT_GRANT_TTL_SECS,
        })
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a grant for `target_url` valid for the configured TTL from now.
    ///
    /// The caller is responsible for having validated the URL scheme.
    pub fn issue_grant(&self, target_url: &str) -> SignedGrant {
        self.issue_grant_at(target_url, chrono::Utc::now().timestamp())
    }

    pub fn issue_grant_at(&self, target_url: &str, now: i64) -> SignedGrant {
        let expires_at = now.saturating_add(self.ttl_secs);
        SignedGrant {
            target_url: target_url.to_string(),
            expires_at,
            signature: self.sign(target_url, expires_at),
        }
    }

    /// Compute the hex signature for a URL and an explicit expiry.
    pub fn sign(&self, target_url: &str, expires_at: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(signing_message(target_url, expires_at).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify grant parameters as presented in a proxy request.
    pub fn verify_grant(
        &self,
        target_url: Option<&str>,
        expires: Option<&str>,
        signature: Option<&str>,
    ) -> Result<(), VerificationError> {
        self.verify_grant_at(
            target_url,
            expires,
            signature,
            chrono::Utc::now().timestamp(),
        )
    }

    /// Verify grant parameters against an explicit clock reading.
    ///
    /// Checks run in order: presence, expiry, signature. The first failure
    /// wins, so a missing field is reported even if the others are bogus.
    pub fn verify_grant_at(
        &self,
        target_url: Option<&str>,
        expires: Option<&str>,
        signature: Option<&str>,
        now: i64,
    ) -> Result<(), VerificationError> {
        let (target_url, expires, signature) = match (
            non_empty(target_url),
            non_empty(expires),
            non_empty(signature),
        ) {
            (Some(u), Some(e), Some(s)) => (u, e, s),
            _ => return Err(VerificationError::MissingParameters),
        };

        // A non-integer expiry could never have been issued by us
        let expires_at: i64 = expires
            .parse()
            .map_err(|_| VerificationError::InvalidSignature)?;

        // Only the exact decimal we issued is bound by the MAC
        if expires_at.to_string() != expires {
            return Err(VerificationError::InvalidSignature);
        }

        if now > expires_at {
            return Err(VerificationError::Expired);
        }

        let provided = decode_signature(signature).ok_or(VerificationError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(signing_message(target_url, expires_at).as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| VerificationError::InvalidSignature)
    }

    /// Verify a grant struct at `now`.
    pub fn verify_signed_at(&self, grant: &SignedGrant, now: i64) -> Result<(), VerificationError> {
        self.verify_grant_at(
            Some(&grant.target_url),
            Some(&grant.expires_at.to_string()),
            Some(&grant.signature),
            now,
        )
    }
}

/// Generate a random 32-byte secret
pub fn random_secret() -> [u8; 32] {
    use rand::Rng;
    rand::thread_rng().gen()
}

fn signing_message(target_url: &str, expires_at: i64) -> String {
    format!("{target_url}|{expires_at}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Only canonical lowercase hex of the exact MAC length is accepted.
fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    if signature.len() != SIGNATURE_HEX_LEN
        || !signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return None;
    }
    hex::decode(signature).ok()
}
