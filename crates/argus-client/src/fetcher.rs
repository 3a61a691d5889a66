use std::net::IpAddr;
use std::time::Duration;

use argus_core::error::AppError;
use argus_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

/// Identifying header value sent on every request, search and candidate
/// pages alike. Kept constant across calls so the tool presents one profile.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.102 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP fetcher using reqwest.
///
/// Downloads raw page bodies with a fixed browser-like User-Agent and a
/// per-request timeout. Candidate URLs come from untrusted search results,
/// so only `http`/`https` schemes are fetched and private/reserved IP
/// literals are refused. Never panics: every transport failure maps to a
/// typed [`AppError`].
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        validate_url(url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::Network(format!("Connection failed: {e}"))
            } else {
                AppError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("Failed to read response body: {e}")))
    }
}

/// Refuse URLs this tool should never request: non-web schemes and
/// private/reserved IP literals (search results are untrusted input).
fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::Http(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::Http(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::Http("URL has no host".to_string()))?;

    if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(AppError::Http(format!(
                "Refusing to fetch private/reserved address {host}"
            )));
        }
    }

    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fe80::/10 link-local, fc00::/7 unique local
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                || v6
                    .to_ipv4_mapped()
                    .is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_addresses_are_refused() {
        for url in [
            "http://127.0.0.1/admin",
            "http://10.0.0.1/",
            "http://192.168.1.1/router",
            "http://169.254.169.254/latest/meta-data/",
            "http://[::1]/",
        ] {
            let err = validate_url(url).unwrap_err();
            assert!(err.to_string().contains("private/reserved"), "{url}");
        }
    }

    #[test]
    fn public_addresses_and_hostnames_pass() {
        assert!(validate_url("https://example.com/shop").is_ok());
        assert!(validate_url("http://8.8.8.8/").is_ok());
    }

    #[test]
    fn non_web_schemes_are_refused() {
        let err = validate_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(validate_url("ftp://example.com/").is_err());
    }

    #[test]
    fn garbage_urls_are_refused_not_panicked_on() {
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }
}
