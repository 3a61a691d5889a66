//! The discovery engine: search → paginate → extract → dedup → match → emit.
//!
//! One engine instance drives one run. Keywords are processed sequentially
//! in the order supplied; within a keyword, candidates are processed in the
//! order the search engine presented them. The only concurrency is the
//! notification dispatcher's consumer, which the engine feeds through a
//! non-blocking handle.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::dispatcher::DispatcherHandle;
use crate::domain::{Domain, SeenDomains};
use crate::error::AppError;
use crate::events::{DiscoveryEvent, EventReporter};
use crate::matcher::ProviderMatcher;
use crate::models::{MatchResult, RunSummary};
use crate::traits::{Fetcher, ResultSink, SearchProvider};

/// Tunables for one discovery run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pacing delay between successive results-page fetches per keyword.
    pub page_delay: Duration,
    /// Providers whose presence in a match withholds it from notifications.
    /// Lowercased on construction; matches are compared case-insensitively.
    pub notify_exclude: Vec<String>,
}

impl Default for EngineConfig {
    /// 1 second page pacing; "paypal" withheld from notifications.
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            notify_exclude: vec!["paypal".to_string()],
        }
    }
}

impl EngineConfig {
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_notify_exclude(mut self, providers: Vec<String>) -> Self {
        self.notify_exclude = providers.into_iter().map(|p| p.to_lowercase()).collect();
        self
    }
}

/// Orchestrates the discovery pipeline over injected collaborators.
///
/// Generic over all external dependencies via traits, enabling dependency
/// injection and testability without real HTTP.
pub struct DiscoveryEngine<F, P, S>
where
    F: Fetcher,
    P: SearchProvider,
    S: ResultSink,
{
    fetcher: F,
    search: P,
    sink: S,
    matcher: ProviderMatcher,
    notifications: Option<DispatcherHandle>,
    config: EngineConfig,
}

impl<F, P, S> DiscoveryEngine<F, P, S>
where
    F: Fetcher,
    P: SearchProvider,
    S: ResultSink,
{
    pub fn new(fetcher: F, search: P, sink: S, matcher: ProviderMatcher) -> Self {
        Self {
            fetcher,
            search,
            sink,
            matcher,
            notifications: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a notification dispatcher. Matches whose providers clear the
    /// exclusion set are enqueued on it.
    pub fn with_notifications(mut self, handle: DispatcherHandle) -> Self {
        self.notifications = Some(handle);
        self
    }

    /// Execute one full run over `keywords`.
    ///
    /// Cancellation is honored at every loop boundary: before each fetch and
    /// inside each pacing sleep. A sink write failure aborts the remaining
    /// run; everything already written stays valid.
    pub async fn run<R: EventReporter>(
        &self,
        keywords: &[String],
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary {
            keywords: keywords.len(),
            ..RunSummary::default()
        };
        // Deduplication spans the whole run, not one keyword: a domain
        // surfaced by an earlier keyword is never fetched again.
        let mut seen = SeenDomains::new();

        reporter.report(DiscoveryEvent::RunStarted {
            keywords: keywords.len(),
        });

        'keywords: for keyword in keywords {
            reporter.report(DiscoveryEvent::KeywordStarted { keyword });
            if let Err(e) = self.sink.append_keyword_header(keyword) {
                return Self::abort(e, reporter);
            }

            let mut url = self.search.first_page_url(keyword);
            let mut page: u32 = 1;

            loop {
                if cancel.is_cancelled() {
                    break 'keywords;
                }

                let body = match self.fetcher.fetch(&url).await {
                    Ok(body) => body,
                    Err(e) => {
                        let error = e.to_string();
                        reporter.report(DiscoveryEvent::PageFetchFailed {
                            keyword,
                            page,
                            error: &error,
                        });
                        break;
                    }
                };
                summary.pages_fetched += 1;

                let results = self.search.parse_results(&body);
                if results.entries.is_empty() {
                    reporter.report(DiscoveryEvent::NoResults { keyword, page });
                    break;
                }

                for entry in &results.entries {
                    if cancel.is_cancelled() {
                        break 'keywords;
                    }
                    let domain = Domain::parse(&entry.url);
                    if !seen.insert(domain.clone()) {
                        continue;
                    }
                    summary.candidates_checked += 1;

                    let providers = match self.fetcher.fetch(&entry.url).await {
                        Ok(candidate_body) => self.matcher.find_in(&candidate_body),
                        // A dead candidate yields no providers, not an error.
                        Err(e) => {
                            let error = e.to_string();
                            reporter.report(DiscoveryEvent::CandidateFetchFailed {
                                domain: domain.as_str(),
                                error: &error,
                            });
                            Vec::new()
                        }
                    };
                    if providers.is_empty() {
                        continue;
                    }

                    let result = MatchResult::new(keyword.clone(), domain, providers);
                    if let Err(e) = self.sink.append_match(&result) {
                        return Self::abort(e, reporter);
                    }
                    reporter.report(DiscoveryEvent::MatchFound { result: &result });
                    summary.matches += 1;
                    self.maybe_notify(&result);
                }

                match results.next_page {
                    Some(next) => {
                        url = next;
                        page += 1;
                        tokio::select! {
                            () = tokio::time::sleep(self.config.page_delay) => {}
                            () = cancel.cancelled() => break 'keywords,
                        }
                    }
                    None => break,
                }
            }

            reporter.report(DiscoveryEvent::KeywordCompleted { keyword, pages: page });
        }

        reporter.report(DiscoveryEvent::RunCompleted { summary });
        Ok(summary)
    }

    fn abort<R: EventReporter>(error: AppError, reporter: &R) -> Result<RunSummary, AppError> {
        let message = error.to_string();
        reporter.report(DiscoveryEvent::RunAborted { error: &message });
        Err(error)
    }

    fn maybe_notify(&self, result: &MatchResult) {
        let Some(handle) = &self.notifications else {
            return;
        };
        let withheld = result
            .providers
            .iter()
            .any(|p| self.config.notify_exclude.contains(&p.to_lowercase()));
        if withheld {
            tracing::debug!(domain = %result.domain, "Match withheld from notifications");
            return;
        }
        handle.enqueue(result.render());
    }
}
