pub mod rate_limiter;
pub mod screenshot_cache;
pub mod screenshot_client;
pub mod url_signer;

pub use rate_limiter::{RateDecision, RateLimiter};
pub use screenshot_cache::{CachedScreenshot, ScreenshotCache};
pub use screenshot_client::{HttpScreenshotClient, ScreenshotProvider};
pub use url_signer::GrantSigner;
