//! Telegram Bot API notifier.
//!
//! Sends messages via the Telegram Bot API (`POST /bot<token>/sendMessage`).
//! Handles 429 rate limits by respecting the `parameters.retry_after` field
//! returned in the JSON response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use super::Notifier;
use crate::config::Config;
use crate::utils::http_client;
use crate::{Error, Result};

/// Maximum number of retries for rate-limited requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Telegram `sendMessage` text limit (UTF-8 characters).
const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Sends plain-text messages to a single Telegram chat.
pub struct TelegramNotifier {
    client: Client,
    api_base: Url,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = http_client::build_client(config.request_timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a notifier that reuses an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_base: config.telegram_api_base.clone(),
            bot_token: config.credentials.telegram_token.clone(),
            chat_id: config.credentials.telegram_chat_id.clone(),
        }
    }

    fn send_message_url(&self) -> Result<Url> {
        self.api_base
            // Leading "./" keeps the "bot<id>:" prefix from parsing as a URL scheme.
            .join(&format!("./bot{}/sendMessage", self.bot_token))
            .map_err(|e| Error::notification(format!("invalid Telegram API URL: {e}")))
    }

    /// Send request with rate limit handling.
    async fn send_with_retry(&self, payload: &serde_json::Value) -> Result<()> {
        let url = self.send_message_url()?;
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = self
                .client
                .post(url.clone())
                .json(payload)
                .send()
                .await
                .map_err(|e| {
                    Error::notification(format!(
                        "Telegram request failed: {}",
                        http_client::describe_error(e)
                    ))
                })?;

            let status = response.status();

            if status.is_success() {
                return Ok(());
            }

            if status.as_u16() == 429 {
                let body: serde_json::Value = response.json().await.unwrap_or_default();

                let retry_after = body
                    .get("parameters")
                    .and_then(|p| p.get("retry_after"))
                    .and_then(|v| v.as_u64())
                    .map(Duration::from_secs);

                if attempts >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        "Telegram rate limit: max retries ({}) exceeded, last retry_after was {:?}",
                        MAX_RATE_LIMIT_RETRIES, retry_after
                    );
                    return Err(Error::notification(format!(
                        "Telegram rate limit exceeded after {} retries",
                        MAX_RATE_LIMIT_RETRIES
                    )));
                }

                let wait_duration = retry_after.unwrap_or(Duration::from_secs(1));
                debug!(
                    "Telegram rate limited (429), waiting {:?} before retry (attempt {}/{})",
                    wait_duration, attempts, MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait_duration).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::notification(format!(
                "Telegram sendMessage failed: {} - {}",
                status, body
            )));
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": truncate_message(text, TELEGRAM_MESSAGE_LIMIT),
        });

        self.send_with_retry(&payload).await
    }
}

/// Truncate a message to fit within the Telegram character limit.
fn truncate_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let suffix = "\n\n[truncated]";
    let budget = limit - suffix.len();
    let truncated: String = text.chars().take(budget).collect();
    format!("{truncated}{suffix}")
}
