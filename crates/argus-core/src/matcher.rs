//! Payment-provider matching against fetched page bodies.

/// Matches a configured set of provider names against page content.
///
/// Matching is case-insensitive substring containment over the full page
/// body. No HTML awareness, no word boundaries: a provider name may match
/// inside another token. Deliberately coarse; false positives are accepted.
#[derive(Debug, Clone)]
pub struct ProviderMatcher {
    /// Provider names as supplied by the caller, order preserved.
    providers: Vec<String>,
    /// Lowercased tokens, index-aligned with `providers`.
    tokens: Vec<String>,
}

impl ProviderMatcher {
    pub fn new(providers: Vec<String>) -> Self {
        let tokens = providers.iter().map(|p| p.to_lowercase()).collect();
        Self { providers, tokens }
    }

    /// Provider names found in `body`, in the configured order.
    pub fn find_in(&self, body: &str) -> Vec<String> {
        let haystack = body.to_lowercase();
        self.tokens
            .iter()
            .zip(&self.providers)
            .filter(|(token, _)| haystack.contains(token.as_str()))
            .map(|(_, provider)| provider.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(names: &[&str]) -> ProviderMatcher {
        ProviderMatcher::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn matching_is_case_insensitive_both_ways() {
        let m = matcher(&["STRIPE"]);
        assert_eq!(m.find_in("Stripe checkout"), vec!["STRIPE"]);

        let m = matcher(&["stripe"]);
        assert_eq!(m.find_in("Powered by STRIPE"), vec!["stripe"]);
    }

    #[test]
    fn preserves_configured_order_not_body_order() {
        let m = matcher(&["stripe", "klarna", "mollie"]);
        let found = m.find_in("pay with Mollie or Stripe");
        assert_eq!(found, vec!["stripe", "mollie"]);
    }

    #[test]
    fn substring_match_without_word_boundary() {
        let m = matcher(&["visa"]);
        assert_eq!(m.find_in("advisable payment options"), vec!["visa"]);
    }

    #[test]
    fn no_match_returns_empty() {
        let m = matcher(&["stripe", "paypal"]);
        assert!(m.find_in("<html>cash on delivery only</html>").is_empty());
    }
}
