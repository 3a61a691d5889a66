//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability so tests can assert on recorded
//! calls after the subject under test is done with its clone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{MatchResult, ResultsPage};
use crate::traits::{Fetcher, Notifier, ResultSink, SearchProvider};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher with per-URL routed responses plus a sequential queue.
///
/// Resolution order per call: a routed response for the exact URL (consumed),
/// then the next queued response, then the `always` body if configured.
/// Every call is recorded for count/ordering assertions.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Vec<Result<String, AppError>>>>>,
    queue: Arc<Mutex<Vec<Result<String, AppError>>>>,
    default_body: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher that answers every URL with the same body.
    pub fn always(body: &str) -> Self {
        let fetcher = Self::default();
        *fetcher.default_body.lock().unwrap() = Some(body.to_string());
        fetcher
    }

    /// Fetcher whose first call fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Fetcher answering calls from a queue, in order.
    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        let fetcher = Self::default();
        *fetcher.queue.lock().unwrap() = responses;
        fetcher
    }

    /// Route a successful body for one exact URL (consumed on use).
    pub fn respond(self, url: &str, body: &str) -> Self {
        self.route(url, Ok(body.to_string()));
        self
    }

    /// Route a failure for one exact URL (consumed on use).
    pub fn fail(self, url: &str, error: AppError) -> Self {
        self.route(url, Err(error));
        self
    }

    fn route(&self, url: &str, response: Result<String, AppError>) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(response);
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());

        let routed = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(responses) if !responses.is_empty() => Some(responses.remove(0)),
                _ => None,
            }
        };
        if let Some(response) = routed {
            return response;
        }

        let queued = {
            let mut queue = self.queue.lock().unwrap();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        if let Some(response) = queued {
            return response;
        }

        match self.default_body.lock().unwrap().as_ref() {
            Some(body) => Ok(body.clone()),
            None => Err(AppError::Http(format!("no mock response for {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedSearch
// ---------------------------------------------------------------------------

/// Mock search provider mapping body markers to scripted result pages.
///
/// Tests route a marker string (e.g. `"PAGE1"`) as the fetch body for a
/// search URL and script what that marker parses to.
#[derive(Clone, Default)]
pub struct ScriptedSearch {
    pages: Arc<Mutex<HashMap<String, ResultsPage>>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, body_marker: &str, page: ResultsPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(body_marker.to_string(), page);
        self
    }

    /// The search URL this provider builds for a keyword, for fetch routing.
    pub fn url_for(&self, keyword: &str) -> String {
        self.first_page_url(keyword)
    }
}

impl SearchProvider for ScriptedSearch {
    fn first_page_url(&self, keyword: &str) -> String {
        format!("https://search.test/results?q={}", keyword.replace(' ', "+"))
    }

    fn parse_results(&self, body: &str) -> ResultsPage {
        self.pages
            .lock()
            .unwrap()
            .get(body)
            .cloned()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// In-memory result sink recording every append.
#[derive(Clone, Default)]
pub struct MemorySink {
    headers: Arc<Mutex<Vec<String>>>,
    matches: Arc<Mutex<Vec<MatchResult>>>,
    header_error: Arc<Mutex<Option<AppError>>>,
    match_error: Arc<Mutex<Option<AppError>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose next header append fails.
    pub fn with_header_error(error: AppError) -> Self {
        let sink = Self::default();
        *sink.header_error.lock().unwrap() = Some(error);
        sink
    }

    /// Sink whose next match append fails.
    pub fn with_match_error(error: AppError) -> Self {
        let sink = Self::default();
        *sink.match_error.lock().unwrap() = Some(error);
        sink
    }

    pub fn headers(&self) -> Vec<String> {
        self.headers.lock().unwrap().clone()
    }

    pub fn matches(&self) -> Vec<MatchResult> {
        self.matches.lock().unwrap().clone()
    }
}

impl ResultSink for MemorySink {
    fn append_keyword_header(&self, keyword: &str) -> Result<(), AppError> {
        if let Some(e) = self.header_error.lock().unwrap().take() {
            return Err(e);
        }
        self.headers.lock().unwrap().push(keyword.to_string());
        Ok(())
    }

    fn append_match(&self, result: &MatchResult) -> Result<(), AppError> {
        if let Some(e) = self.match_error.lock().unwrap().take() {
            return Err(e);
        }
        self.matches.lock().unwrap().push(result.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notifier recording delivered texts, with optional scripted failures.
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<AppError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that fails the first `failures.len()` sends, then succeeds.
    pub fn with_failures(failures: Vec<AppError>) -> Self {
        let notifier = Self::default();
        *notifier.failures.lock().unwrap() = failures;
        notifier
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, text: &str) -> Result<(), AppError> {
        let failure = {
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() {
                None
            } else {
                Some(failures.remove(0))
            }
        };
        if let Some(e) = failure {
            return Err(e);
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Event reporter recording event labels in emission order.
#[derive(Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl crate::events::EventReporter for RecordingReporter {
    fn report(&self, event: crate::events::DiscoveryEvent<'_>) {
        let label = match &event {
            crate::events::DiscoveryEvent::RunStarted { .. } => "RunStarted",
            crate::events::DiscoveryEvent::KeywordStarted { .. } => "KeywordStarted",
            crate::events::DiscoveryEvent::PageFetchFailed { .. } => "PageFetchFailed",
            crate::events::DiscoveryEvent::NoResults { .. } => "NoResults",
            crate::events::DiscoveryEvent::CandidateFetchFailed { .. } => "CandidateFetchFailed",
            crate::events::DiscoveryEvent::MatchFound { .. } => "MatchFound",
            crate::events::DiscoveryEvent::KeywordCompleted { .. } => "KeywordCompleted",
            crate::events::DiscoveryEvent::RunCompleted { .. } => "RunCompleted",
            crate::events::DiscoveryEvent::RunAborted { .. } => "RunAborted",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}
