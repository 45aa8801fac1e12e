//! Per-run single-flight cache for page-speed measurements.
//!
//! Leads that share a website (chains, franchise listings) trigger one
//! measurement. Concurrent callers for the same normalised URL await the
//! same in-flight request and observe the same result, success or failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use tokio::sync::OnceCell;

use crate::error::AuditError;
use crate::pagespeed::{SpeedMeasurement, SpeedReport};

type Cell = Arc<OnceCell<Result<SpeedReport, String>>>;

pub struct SpeedCache {
    inner: Arc<dyn SpeedMeasurement>,
    cells: Mutex<HashMap<String, Cell>>,
}

impl SpeedCache {
    #[must_use]
    pub fn new(inner: Arc<dyn SpeedMeasurement>) -> Self {
        Self {
            inner,
            cells: Mutex::new(HashMap::new()),
        }
    }

    fn cell_for(&self, key: &str) -> Cell {
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(cells.entry(key.to_string()).or_default())
    }
}

#[async_trait]
impl SpeedMeasurement for SpeedCache {
    async fn measure(&self, url: &str) -> Result<SpeedReport, AuditError> {
        let cell = self.cell_for(&cache_key(url));
        let result = cell
            .get_or_init(|| async {
                self.inner.measure(url).await.map_err(|e| e.to_string())
            })
            .await;
        result.clone().map_err(AuditError::Shared)
    }
}

/// Scheme and host lowercased, fragment dropped, trailing slash trimmed.
fn cache_key(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => url.trim().trim_end_matches('/').to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    struct CountingSpeed {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl SpeedMeasurement for CountingSpeed {
        async fn measure(&self, _url: &str) -> Result<SpeedReport, AuditError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                Err(AuditError::PageSpeedApi("quota exceeded".to_string()))
            } else {
                Ok(SpeedReport {
                    lcp_seconds: Some(4.2),
                    performance_score: Some(38),
                })
            }
        }
    }

    fn counting(fail: bool) -> Arc<CountingSpeed> {
        Arc::new(CountingSpeed {
            calls: AtomicU32::new(0),
            fail,
        })
    }

    #[test]
    fn cache_key_normalises() {
        assert_eq!(cache_key("HTTPS://Example.com/"), "https://example.com");
        assert_eq!(cache_key("https://example.com/#top"), "https://example.com");
        assert_eq!(cache_key("https://example.com/a/"), "https://example.com/a");
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_measurement() {
        let inner = counting(false);
        let cache = SpeedCache::new(inner.clone());
        let (a, b, c) = tokio::join!(
            cache.measure("https://example.com"),
            cache.measure("https://EXAMPLE.com/"),
            cache.measure("https://example.com/#hero"),
        );
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().lcp_seconds, Some(4.2));
        assert_eq!(b.unwrap().performance_score, Some(38));
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn failures_are_shared_too() {
        let inner = counting(true);
        let cache = SpeedCache::new(inner.clone());
        let first = cache.measure("https://example.com").await.unwrap_err();
        let second = cache.measure("https://example.com").await.unwrap_err();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.to_string(), second.to_string());
        assert!(first.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn distinct_urls_are_measured_separately() {
        let inner = counting(false);
        let cache = SpeedCache::new(inner.clone());
        cache.measure("https://a.example").await.unwrap();
        cache.measure("https://b.example").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
