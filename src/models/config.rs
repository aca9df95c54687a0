use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::services::url_signer::MAX_GRANT_TTL_SECS;

/// Secrets shorter than this are accepted but logged as weak
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Application configuration loaded from an optional config.yaml,
/// with environment variables taking precedence.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Secret keying the grant HMAC. Required; there is no fallback.
    pub signing_secret: Option<String>,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Lifetime of issued grants in seconds
    pub grant_ttl_secs: i64,

    /// Upstream screenshot API settings
    pub screenshot: ScreenshotApiConfig,

    /// Capture endpoint rate limiting
    pub rate_limit: RateLimitConfig,

    /// Maximum number of captured screenshots kept in memory
    pub cache_max_entries: usize,
}

/// Settings for the third-party screenshot capture API
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ScreenshotApiConfig {
    /// Capture endpoint, e.g. `https://api.screenshotone.com/take`
    pub api_url: String,

    /// Access key sent upstream; never exposed to clients
    pub api_key: String,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Capture the full scrollable page instead of the viewport
    pub full_page: bool,

    /// Upper bound for a single upstream request in seconds
    pub timeout_secs: u64,
}

impl Default for ScreenshotApiConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            viewport_width: 1280,
            viewport_height: 800,
            full_page: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,

    /// How often expired windows are swept, in seconds
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            grant_ttl_secs: 3600,
            screenshot: ScreenshotApiConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache_max_entries: 64,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file if given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_yaml_str(&content)?;
                tracing::info!(path = %path.display(), "Loaded configuration file");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load using `CONFIG_FILE` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_file = std::env::var("CONFIG_FILE").ok();
        let mut config = Self::load(config_file.as_deref().map(Path::new))?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override settings from environment-style lookups.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(secret) = get("SIGNING_SECRET") {
            self.signing_secret = Some(secret);
        }
        if let Some(addr) = get("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = get("SCREENSHOT_API_URL") {
            self.screenshot.api_url = url;
        }
        if let Some(key) = get("SCREENSHOT_API_KEY") {
            self.screenshot.api_key = key;
        }
        if let Some(ttl) = get("GRANT_TTL_SECS") {
            self.grant_ttl_secs = parse_setting("GRANT_TTL_SECS", &ttl)?;
        }
        if let Some(timeout) = get("UPSTREAM_TIMEOUT_SECS") {
            self.screenshot.timeout_secs = parse_setting("UPSTREAM_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(max) = get("RATE_LIMIT_MAX_REQUESTS") {
            self.rate_limit.max_requests = parse_setting("RATE_LIMIT_MAX_REQUESTS", &max)?;
        }
        if let Some(window) = get("RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.window_secs = parse_setting("RATE_LIMIT_WINDOW_SECS", &window)?;
        }

        Ok(())
    }

    /// The configured signing secret, or a hard error if there is none
    pub fn signing_secret(&self) -> Result<&str, ConfigError> {
        let secret = self
            .signing_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "SIGNING_SECRET is shorter than recommended"
            );
        }

        Ok(secret)
    }

    /// Check everything the HTTP server needs before it starts
    pub fn validate_for_serve(&self) -> Result<(), ConfigError> {
        self.signing_secret()?;

        if self.screenshot.api_url.is_empty() {
            return Err(ConfigError::MissingSetting("SCREENSHOT_API_URL"));
        }
        if self.screenshot.api_key.is_empty() {
            return Err(ConfigError::MissingSetting("SCREENSHOT_API_KEY"));
        }
        if !(1..=MAX_GRANT_TTL_SECS).contains(&self.grant_ttl_secs) {
            return Err(ConfigError::InvalidValue {
                name: "GRANT_TTL_SECS",
                value: self.grant_ttl_secs.to_string(),
            });
        }
        if self.screenshot.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "UPSTREAM_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_WINDOW_SECS",
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_setting<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
