use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use xhswatch_core::NotifyError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Outbound notification boundary. Implementations either deliver for real
/// or suppress delivery (dry-run); the dispatcher treats both uniformly.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API client for one bot/chat pair.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    /// Same client against a different API host. Tests point this at a
    /// local mock server.
    pub fn with_base_url(base_url: &str, bot_token: &str, chat_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.bot_token)
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Bot API {method} delivered to chat {}", self.chat_id);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.post(
            "sendMessage",
            serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "disable_web_page_preview": true,
            }),
        )
        .await
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotifyError> {
        self.post(
            "sendPhoto",
            serde_json::json!({
                "chat_id": self.chat_id,
                "photo": photo_url,
                "caption": caption,
            }),
        )
        .await
    }
}

/// Suppresses every delivery while keeping the dispatcher's bookkeeping
/// honest: a suppressed send reports `NotifyError::DryRun`, so the
/// candidate is not marked seen and stays queued for a real delivery.
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        info!(
            "Dry-run: suppressed text notification: {}",
            text.lines().next().unwrap_or("<empty>")
        );
        Err(NotifyError::DryRun)
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotifyError> {
        info!(
            "Dry-run: suppressed photo notification ({photo_url}): {}",
            caption.lines().next().unwrap_or("<empty>")
        );
        Err(NotifyError::DryRun)
    }
}
