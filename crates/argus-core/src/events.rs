//! Progress events emitted by the discovery engine.
//!
//! Replaces any presentation-layer coupling with message passing: the engine
//! reports milestones through [`EventReporter`] and never touches a UI.

use crate::models::{MatchResult, RunSummary};

/// Milestones of one discovery run, in emission order.
#[derive(Debug, Clone)]
pub enum DiscoveryEvent<'a> {
    RunStarted {
        keywords: usize,
    },
    KeywordStarted {
        keyword: &'a str,
    },
    /// A results page could not be retrieved; the keyword's pagination ends.
    PageFetchFailed {
        keyword: &'a str,
        page: u32,
        error: &'a str,
    },
    /// A results page parsed to zero entries; the keyword's pagination ends.
    NoResults {
        keyword: &'a str,
        page: u32,
    },
    /// A candidate page could not be retrieved; treated as no providers found.
    CandidateFetchFailed {
        domain: &'a str,
        error: &'a str,
    },
    MatchFound {
        result: &'a MatchResult,
    },
    KeywordCompleted {
        keyword: &'a str,
        pages: u32,
    },
    RunCompleted {
        summary: RunSummary,
    },
    /// Terminal failure outside the per-fetch boundaries. Emitted once.
    RunAborted {
        error: &'a str,
    },
}

/// Receives engine events (decoupled observation).
pub trait EventReporter: Send + Sync {
    fn report(&self, event: DiscoveryEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that forwards events to the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl EventReporter for TracingReporter {
    fn report(&self, event: DiscoveryEvent<'_>) {
        match event {
            DiscoveryEvent::RunStarted { keywords } => {
                tracing::info!(%keywords, "Discovery run started");
            }
            DiscoveryEvent::KeywordStarted { keyword } => {
                tracing::info!(%keyword, "Searching");
            }
            DiscoveryEvent::PageFetchFailed {
                keyword,
                page,
                error,
            } => {
                tracing::warn!(%keyword, %page, %error, "Results page fetch failed");
            }
            DiscoveryEvent::NoResults { keyword, page } => {
                tracing::info!(%keyword, %page, "No results on this page");
            }
            DiscoveryEvent::CandidateFetchFailed { domain, error } => {
                tracing::debug!(%domain, %error, "Candidate fetch failed");
            }
            DiscoveryEvent::MatchFound { result } => {
                tracing::info!(
                    domain = %result.domain,
                    providers = %result.providers.join(", "),
                    "Match found"
                );
            }
            DiscoveryEvent::KeywordCompleted { keyword, pages } => {
                tracing::info!(%keyword, %pages, "Keyword completed");
            }
            DiscoveryEvent::RunCompleted { summary } => {
                tracing::info!(
                    keywords = %summary.keywords,
                    pages = %summary.pages_fetched,
                    candidates = %summary.candidates_checked,
                    matches = %summary.matches,
                    "Discovery run completed"
                );
            }
            DiscoveryEvent::RunAborted { error } => {
                tracing::error!(%error, "Discovery run aborted");
            }
        }
    }
}
