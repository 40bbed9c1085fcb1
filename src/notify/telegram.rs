//! Telegram Bot API push.

use reqwest::Client;

use crate::core::http::{self, NOTIFY_TIMEOUT};
use crate::error::{AlertError, Result};
use crate::storage::TelegramConfig;

/// Sends chat messages through a Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Build a notifier from the `Telegram` config section.
    ///
    /// A bad `Proxy` value never fails construction; see
    /// [`http::build_proxied_client`].
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_proxied_client(NOTIFY_TIMEOUT, &config.proxy)?,
            endpoint: send_message_url(&config.api_host, &config.bot_token),
            chat_id: config.user_id.clone(),
        })
    }

    /// Push `text` to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns `ChatDelivery` on transport failure or a non-2xx status.
    pub async fn send(&self, text: &str) -> Result<()> {
        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AlertError::ChatDelivery(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Telegram rejected message");
            return Err(AlertError::ChatDelivery(format!(
                "Telegram Bot push failed with status code: {}",
                status.as_u16()
            )));
        }

        tracing::info!("Telegram Bot push succeeded");
        Ok(())
    }
}

/// `sendMessage` endpoint for a bot.
///
/// `api_host` is normally a bare host; a value that already carries a scheme
/// is used as the base URL unchanged.
#[must_use]
pub fn send_message_url(api_host: &str, bot_token: &str) -> String {
    let host = api_host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/bot{bot_token}/sendMessage")
    } else {
        format!("https://{host}/bot{bot_token}/sendMessage")
    }
}
