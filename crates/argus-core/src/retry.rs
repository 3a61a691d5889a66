//! Opt-in bounded retry for transient fetch failures.
//!
//! The reference behavior treats any fetch failure as terminal for that
//! fetch, so retries default to zero. Enabling them is an explicit hardening
//! choice made by the caller.

use std::time::Duration;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Retry policy: at most `attempts` re-fetches, fixed `backoff` between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    /// No retries — matches the reference behavior.
    fn default() -> Self {
        Self {
            attempts: 0,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// [`Fetcher`] decorator that retries transient failures.
///
/// Only errors classified transient by [`AppError::is_transient`] are
/// retried; a 404 or parse-level failure surfaces immediately.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let mut attempt = 0u32;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.policy.attempts => {
                    attempt += 1;
                    tracing::debug!(%url, %attempt, error = %e, "Retrying transient fetch failure");
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    #[tokio::test]
    async fn default_policy_does_not_retry() {
        let inner = MockFetcher::with_responses(vec![
            Err(AppError::Timeout(10)),
            Ok("<html>late</html>".into()),
        ]);
        let fetcher = RetryingFetcher::new(inner.clone(), RetryPolicy::default());

        let err = fetcher.fetch("http://a.test").await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(inner.calls().len(), 1);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_until_success() {
        let inner = MockFetcher::with_responses(vec![
            Err(AppError::Network("reset".into())),
            Err(AppError::Timeout(10)),
            Ok("<html>ok</html>".into()),
        ]);
        let policy = RetryPolicy::new(3).with_backoff(Duration::from_millis(1));
        let fetcher = RetryingFetcher::new(inner.clone(), policy);

        let body = fetcher.fetch("http://a.test").await.unwrap();
        assert_eq!(body, "<html>ok</html>");
        assert_eq!(inner.calls().len(), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_surfaces_immediately() {
        let inner = MockFetcher::with_responses(vec![
            Err(AppError::Http("HTTP 404 for http://a.test".into())),
            Ok("<html>never</html>".into()),
        ]);
        let policy = RetryPolicy::new(3).with_backoff(Duration::from_millis(1));
        let fetcher = RetryingFetcher::new(inner.clone(), policy);

        let err = fetcher.fetch("http://a.test").await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert_eq!(inner.calls().len(), 1);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let inner = MockFetcher::with_responses(vec![
            Err(AppError::Timeout(10)),
            Err(AppError::Timeout(10)),
            Err(AppError::Timeout(10)),
        ]);
        let policy = RetryPolicy::new(2).with_backoff(Duration::from_millis(1));
        let fetcher = RetryingFetcher::new(inner.clone(), policy);

        let err = fetcher.fetch("http://a.test").await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(inner.calls().len(), 3);
    }
}
