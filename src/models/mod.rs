pub mod config;
pub mod grant;

pub use config::{AppConfig, RateLimitConfig, ScreenshotApiConfig};
pub use grant::{SignedGrant, PROXY_PATH};
