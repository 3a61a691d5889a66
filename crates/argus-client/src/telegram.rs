use std::time::Duration;

use argus_core::error::AppError;
use argus_core::traits::Notifier;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const TELEGRAM_API_ORIGIN: &str = "https://api.telegram.org";
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Telegram Bot API client for match notifications.
///
/// Sends plain text messages to one chat. Failures map to
/// [`AppError::Notification`]; the dispatcher logs and swallows them, so a
/// broken bot token degrades to a silent channel rather than a broken run.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
    timeout_secs: u64,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Result<Self, AppError> {
        Self::with_base_url(token, chat_id, TELEGRAM_API_ORIGIN)
    }

    /// Point the notifier at a different API origin (proxy, test server).
    pub fn with_base_url(token: &str, chat_id: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::Notification(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            timeout_secs: DEFAULT_SEND_TIMEOUT.as_secs(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

// ---- Bot API wire types ----

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), AppError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Notification(format!(
                        "send timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    AppError::Notification(format!("send failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let decoded: Option<SendMessageResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() || decoded.as_ref().is_none_or(|r| !r.ok) {
            let description = decoded
                .and_then(|r| r.description)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AppError::Notification(description));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_token_and_method() {
        let notifier = TelegramNotifier::new("123:abc", "-100200").unwrap();
        assert_eq!(
            notifier.endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let notifier =
            TelegramNotifier::with_base_url("t", "c", "http://localhost:8080/").unwrap();
        assert_eq!(notifier.endpoint(), "http://localhost:8080/bott/sendMessage");
    }

    #[test]
    fn request_payload_shape() {
        let request = SendMessageRequest {
            chat_id: "42",
            text: "URL: https://a.test",
            parse_mode: "Markdown",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "chat_id": "42",
                "text": "URL: https://a.test",
                "parse_mode": "Markdown",
            })
        );
    }

    #[test]
    fn api_error_response_decodes_description() {
        let decoded: SendMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
                .unwrap();
        assert!(!decoded.ok);
        assert_eq!(decoded.description.as_deref(), Some("Unauthorized"));
    }
}
