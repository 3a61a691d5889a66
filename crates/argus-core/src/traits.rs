use std::future::Future;

use crate::error::AppError;
use crate::models::{MatchResult, ResultsPage};

/// Fetches the raw body of a URL.
///
/// Implementations must map every transport failure (DNS, connect, timeout,
/// non-2xx status) to a typed [`AppError`] — callers decide whether a failed
/// fetch ends pagination or merely yields no provider matches.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Builds search URLs and parses result pages for one search engine.
pub trait SearchProvider: Send + Sync + Clone {
    /// First results-page URL for a keyword, query percent-encoded.
    fn first_page_url(&self, keyword: &str) -> String;

    /// Extract candidate entries and the next-page link from a results body.
    ///
    /// Infallible: entries without a discoverable link are skipped, an
    /// unrecognized body yields an empty page. `next_page` is absolute,
    /// already resolved against the engine origin.
    fn parse_results(&self, body: &str) -> ResultsPage;
}

/// Append-only destination for discovered matches.
///
/// Entries are never rewritten or removed; a write failure is fatal to the
/// run (already-written entries remain valid).
pub trait ResultSink: Send + Sync {
    fn append_keyword_header(&self, keyword: &str) -> Result<(), AppError>;

    fn append_match(&self, result: &MatchResult) -> Result<(), AppError>;
}

/// Sends one text message to the external notification channel.
pub trait Notifier: Send + Sync + Clone {
    fn notify(&self, text: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}
