//! Domain normalization and per-run deduplication.
//!
//! A [`Domain`] is the canonical identity of a discovered site for the
//! lifetime of one run: URLs differing only in scheme, `www.` prefix, path,
//! or query collapse to the same domain.

use std::collections::HashSet;
use std::fmt;

/// Bare domain derived from a raw URL. Deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Domain(String);

impl Domain {
    /// Normalize a raw URL to its bare domain.
    ///
    /// Strips a leading `http://` or `https://`, then a leading `www.`,
    /// then truncates at the first `/`.
    pub fn parse(raw_url: &str) -> Self {
        let rest = raw_url
            .strip_prefix("https://")
            .or_else(|| raw_url.strip_prefix("http://"))
            .unwrap_or(raw_url);
        let rest = rest.strip_prefix("www.").unwrap_or(rest);
        let host = rest.split('/').next().unwrap_or(rest);
        Self(host.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of domains already processed in this run.
///
/// Grows monotonically, never persisted across runs.
#[derive(Debug, Default)]
pub struct SeenDomains {
    seen: HashSet<Domain>,
}

impl SeenDomains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.seen.contains(domain)
    }

    /// Mark a domain as seen. Idempotent; returns true on first insertion.
    pub fn insert(&mut self, domain: Domain) -> bool {
        self.seen.insert(domain)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_www_path_and_query_are_ignored() {
        assert_eq!(
            Domain::parse("https://www.example.com/path?q=1"),
            Domain::parse("http://example.com/other")
        );
        assert_eq!(Domain::parse("https://example.com").as_str(), "example.com");
        assert_eq!(Domain::parse("http://www.example.com/").as_str(), "example.com");
    }

    #[test]
    fn schemeless_url_is_truncated_at_first_slash() {
        assert_eq!(Domain::parse("example.com/shop/cart").as_str(), "example.com");
    }

    #[test]
    fn subdomains_other_than_www_are_distinct() {
        assert_ne!(
            Domain::parse("https://shop.example.com"),
            Domain::parse("https://example.com")
        );
    }

    #[test]
    fn insert_is_idempotent() {
        let mut seen = SeenDomains::new();
        assert!(seen.insert(Domain::parse("https://a.test")));
        assert!(!seen.insert(Domain::parse("http://www.a.test/page")));
        assert_eq!(seen.len(), 1);
        assert!(seen.contains(&Domain::parse("a.test")));
    }
}
