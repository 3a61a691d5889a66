use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Domain;

/// One organic entry extracted from a search-results page.
///
/// Ephemeral: candidates exist only between parsing and deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Display text of the result link.
    pub title: String,
    /// Raw href as returned by the search engine.
    pub url: String,
}

/// Parsed contents of one search-results page.
#[derive(Debug, Clone, Default)]
pub struct ResultsPage {
    /// Organic entries in the order the engine presented them.
    pub entries: Vec<CandidateEntry>,
    /// Absolute URL of the next results page, if the page has one.
    pub next_page: Option<String>,
}

/// A discovered webshop together with the payment providers found on it.
///
/// Immutable once created; appended to the result sink exactly once per run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchResult {
    pub id: Uuid,
    /// Keyword whose search surfaced this site.
    pub keyword: String,
    pub domain: Domain,
    /// Canonical `https://{domain}` form used in output and notifications.
    pub url: String,
    /// Matched provider names, caller-supplied ordering preserved. Never empty.
    pub providers: Vec<String>,
    pub discovered_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn new(keyword: impl Into<String>, domain: Domain, providers: Vec<String>) -> Self {
        debug_assert!(!providers.is_empty(), "match with no providers");
        let url = format!("https://{domain}");
        Self {
            id: Uuid::new_v4(),
            keyword: keyword.into(),
            domain,
            url,
            providers,
            discovered_at: Utc::now(),
        }
    }

    /// Text block written to the sink and sent to the notification channel.
    pub fn render(&self) -> String {
        format!(
            "URL: {}\nPayment Providers Found: {}\n",
            self.url,
            self.providers.join(", ")
        )
    }
}

/// A message owned by the notification dispatcher queue until sent.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub text: String,
    /// Pacing delay the consumer observes after sending this message.
    pub delay: Duration,
}

impl NotificationMessage {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
        }
    }
}

/// Counters for one completed (or aborted) discovery run.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RunSummary {
    pub keywords: usize,
    pub pages_fetched: usize,
    pub candidates_checked: usize,
    pub matches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_result_renders_url_and_providers() {
        let result = MatchResult::new(
            "buy shoes",
            Domain::parse("https://www.a.test/checkout"),
            vec!["stripe".into(), "klarna".into()],
        );
        assert_eq!(result.url, "https://a.test");
        assert_eq!(
            result.render(),
            "URL: https://a.test\nPayment Providers Found: stripe, klarna\n"
        );
    }
}
