use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default maximum number of cached screenshots
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// Captured screenshot ready to be served through the proxy
#[derive(Clone)]
pub struct CachedScreenshot {
    /// PNG bytes as returned by the upstream API
    pub png_bytes: Bytes,
    /// When this screenshot was captured
    pub captured_at: chrono::DateTime<chrono::Utc>,
    stored_at: Instant,
}

/// Cache for captured screenshots, keyed by target URL
pub struct ScreenshotCache {
    cache: Arc<RwLock<HashMap<String, CachedScreenshot>>>,
    ttl: Duration,
    max_entries: usize,
}

impl ScreenshotCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries,
        }
    }

    /// Store a screenshot for a target URL, evicting the oldest entry when full
    pub async fn store(&self, target_url: &str, png_bytes: Bytes) {
        let mut cache = self.cache.write().await;

        cache.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);

        if !cache.contains_key(target_url) {
            while cache.len() >= self.max_entries {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(key) => {
                        cache.remove(&key);
                        tracing::debug!(target_url = %key, "Screenshot cache: evicted oldest entry");
                    }
                    None => break,
                }
            }
        }

        cache.insert(
            target_url.to_string(),
            CachedScreenshot {
                png_bytes,
                captured_at: chrono::Utc::now(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Retrieve a screenshot if one is cached and still fresh
    pub async fn get(&self, target_url: &str) -> Option<CachedScreenshot> {
        let cache = self.cache.read().await;
        cache
            .get(target_url)
            .filter(|entry| entry.stored_at.elapsed() <= self.ttl)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ScreenshotCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), DEFAULT_MAX_ENTRIES)
    }
}
