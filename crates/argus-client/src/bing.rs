//! Bing search-results parsing.
//!
//! One organic result is an `<li class="b_algo">` element; its first
//! `<a href>` carries the landing URL and display text. Pagination is a
//! single `<a title="Next page">` control whose relative href resolves
//! against the engine origin. Absence of that control means last page.

use argus_core::error::AppError;
use argus_core::models::{CandidateEntry, ResultsPage};
use argus_core::traits::SearchProvider;
use scraper::{Html, Selector};
use url::Url;

const BING_ORIGIN: &str = "https://www.bing.com";

/// [`SearchProvider`] for Bing's HTML results pages.
#[derive(Clone)]
pub struct BingSearch {
    origin: Url,
    result_selector: Selector,
    link_selector: Selector,
    next_selector: Selector,
}

impl BingSearch {
    pub fn new() -> Result<Self, AppError> {
        Self::with_origin(BING_ORIGIN)
    }

    /// Point the provider at a different origin (mirror, test server).
    pub fn with_origin(origin: &str) -> Result<Self, AppError> {
        let origin =
            Url::parse(origin).map_err(|e| AppError::Parse(format!("invalid origin: {e}")))?;
        Ok(Self {
            origin,
            result_selector: parse_selector("li.b_algo")?,
            link_selector: parse_selector("a[href]")?,
            next_selector: parse_selector(r#"a[title="Next page"]"#)?,
        })
    }
}

impl SearchProvider for BingSearch {
    fn first_page_url(&self, keyword: &str) -> String {
        let mut url = self.origin.clone();
        url.set_path("/search");
        url.query_pairs_mut().append_pair("q", keyword);
        url.to_string()
    }

    fn parse_results(&self, body: &str) -> ResultsPage {
        let document = Html::parse_document(body);

        let mut entries = Vec::new();
        for result in document.select(&self.result_selector) {
            // A result without a link is skipped, not an error.
            let Some(link) = result.select(&self.link_selector).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            entries.push(CandidateEntry {
                title: link.text().collect::<String>().trim().to_string(),
                url: href.trim().to_string(),
            });
        }

        let next_page = document
            .select(&self.next_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| self.origin.join(href).ok())
            .map(|u| u.to_string());

        ResultsPage { entries, next_page }
    }
}

fn parse_selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Parse(format!("invalid selector '{css}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bing() -> BingSearch {
        BingSearch::new().unwrap()
    }

    const RESULTS_PAGE: &str = r#"<html><body>
        <ol id="b_results">
            <li class="b_algo"><h2><a href="https://www.a.test/shop">A Shop - buy shoes online</a></h2><p>snippet</p></li>
            <li class="b_algo"><div class="b_caption">result without any link</div></li>
            <li class="b_ad"><a href="https://ads.test/">sponsored</a></li>
            <li class="b_algo"><h2><a href="http://b.test/">B Shop</a></h2></li>
        </ol>
        <a title="Next page" href="/search?q=buy+shoes&amp;first=11">&gt;</a>
    </body></html>"#;

    #[test]
    fn extracts_organic_entries_in_page_order() {
        let page = bing().parse_results(RESULTS_PAGE);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].url, "https://www.a.test/shop");
        assert_eq!(page.entries[0].title, "A Shop - buy shoes online");
        assert_eq!(page.entries[1].url, "http://b.test/");
    }

    #[test]
    fn entry_without_link_is_silently_skipped() {
        let page = bing().parse_results(RESULTS_PAGE);
        assert!(page.entries.iter().all(|e| !e.url.is_empty()));
    }

    #[test]
    fn next_page_link_resolves_against_origin() {
        let page = bing().parse_results(RESULTS_PAGE);
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.bing.com/search?q=buy+shoes&first=11")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let body = r#"<li class="b_algo"><a href="https://a.test/">A</a></li>"#;
        let page = bing().parse_results(body);
        assert_eq!(page.entries.len(), 1);
        assert!(page.next_page.is_none());
    }

    #[test]
    fn unrecognized_body_parses_to_empty_page() {
        let page = bing().parse_results("<html><body><p>captcha wall</p></body></html>");
        assert!(page.entries.is_empty());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn first_page_url_percent_encodes_keyword() {
        let url = bing().first_page_url("buy shoes & boots");
        assert_eq!(
            url,
            "https://www.bing.com/search?q=buy+shoes+%26+boots"
        );
    }
}
