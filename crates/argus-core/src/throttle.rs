//! Per-domain request pacing.
//!
//! Wraps any [`Fetcher`] with a minimum delay between consecutive requests
//! to the same host, the baseline politeness measure for hitting third-party
//! sites and the search engine itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use url::Url;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Pacing configuration for [`ThrottledFetcher`].
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum delay between consecutive requests to the same host.
    pub delay: Duration,
    /// Maximum random jitter added on top of `delay` (uniform [0, jitter]).
    pub jitter: Duration,
}

impl ThrottleConfig {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    fn effective_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        self.delay + Duration::from_millis(jitter_ms(self.jitter.as_millis() as u64))
    }
}

impl Default for ThrottleConfig {
    /// 1 second delay, 500 ms jitter.
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            jitter: Duration::from_millis(500),
        }
    }
}

/// [`Fetcher`] decorator enforcing per-host pacing.
///
/// Tracks the last request time per host and sleeps before a new request to
/// the same host until the minimum delay has elapsed. Hosts are independent:
/// waiting on one never delays another.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    config: ThrottleConfig,
    last_request: Arc<Mutex<HashMap<String, Instant>>>,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, config: ThrottleConfig) -> Self {
        Self {
            inner,
            config,
            last_request: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pacing key for a URL: the host, or the whole string when unparseable
    /// (an unparseable URL still gets paced, just under a degenerate key).
    fn host_key(url_str: &str) -> String {
        Url::parse(url_str)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url_str.to_string())
    }

    async fn wait_for_host(&self, host: &str) {
        let mut map = self.last_request.lock().await;
        if let Some(&last) = map.get(host) {
            let required = self.config.effective_delay();
            let elapsed = last.elapsed();
            if elapsed < required {
                let pause = required - elapsed;
                // Release the lock while sleeping so other hosts proceed.
                drop(map);
                tracing::debug!(%host, pause_ms = %pause.as_millis(), "Throttling request");
                tokio::time::sleep(pause).await;
                map = self.last_request.lock().await;
            }
        }
        map.insert(host.to_string(), Instant::now());
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.wait_for_host(&Self::host_key(url)).await;
        self.inner.fetch(url).await
    }
}

// Jitter from a time-seeded xorshift — good enough for pacing, avoids the
// `rand` dependency.
fn jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    #[test]
    fn host_key_ignores_scheme_port_and_path() {
        assert_eq!(
            ThrottledFetcher::<MockFetcher>::host_key("https://example.com/path?q=1"),
            "example.com"
        );
        assert_eq!(
            ThrottledFetcher::<MockFetcher>::host_key("http://example.com:8080/page"),
            "example.com"
        );
    }

    #[test]
    fn effective_delay_with_jitter_is_bounded() {
        let config =
            ThrottleConfig::new(Duration::from_millis(100)).with_jitter(Duration::from_millis(50));
        for _ in 0..100 {
            let d = config.effective_delay();
            assert!(d >= Duration::from_millis(100));
            assert!(d < Duration::from_millis(150));
        }
    }

    #[tokio::test]
    async fn same_host_requests_are_spaced() {
        let fetcher = ThrottledFetcher::new(
            MockFetcher::always("<html>ok</html>"),
            ThrottleConfig::new(Duration::from_millis(100)),
        );

        let start = Instant::now();
        fetcher.fetch("http://example.com/a").await.unwrap();
        fetcher.fetch("http://example.com/b").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn different_hosts_are_not_spaced() {
        let fetcher = ThrottledFetcher::new(
            MockFetcher::always("<html>ok</html>"),
            ThrottleConfig::new(Duration::from_millis(200)),
        );

        let start = Instant::now();
        fetcher.fetch("http://a.test/").await.unwrap();
        fetcher.fetch("http://b.test/").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn passes_through_errors() {
        let fetcher = ThrottledFetcher::new(
            MockFetcher::with_error(AppError::Http("fail".into())),
            ThrottleConfig::new(Duration::ZERO),
        );
        let err = fetcher.fetch("http://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }
}
