//! Gmail API push.
//!
//! Delivery is best-effort from the caller's point of view: every failure is
//! returned as an error, and the run orchestration decides to log and ignore it.

pub mod oauth;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use reqwest::Client;
use serde::Serialize;

use crate::core::http::{self, NOTIFY_TIMEOUT};
use crate::error::{AlertError, Result};
use crate::storage::EmailConfig;

pub use oauth::{ClientSecret, OAuthToken};

/// Subject line on every alert mail.
pub const SUBJECT: &str = "Electricity Alert";

#[derive(Serialize)]
struct SendRequest {
    raw: String,
}

/// Sends alert mail through the Gmail API using a cached OAuth token.
#[derive(Debug, Clone)]
pub struct GmailNotifier {
    client: Client,
    config: EmailConfig,
}

impl GmailNotifier {
    /// Build a notifier from the `Email` config section.
    ///
    /// Credential files are read lazily on each send.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(config: &EmailConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(NOTIFY_TIMEOUT)?,
            config: config.clone(),
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/me/messages/send",
            self.config.api_base().trim_end_matches('/')
        )
    }

    /// Mail `body` to the configured recipient.
    ///
    /// Never prompts: a missing token file is an error pointing at
    /// `--authorize-email`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsFile`, `AuthNotConfigured`, `AuthInvalid`, or
    /// `EmailDelivery`.
    pub async fn send(&self, body: &str) -> Result<()> {
        let secret = ClientSecret::load(&self.config.credentials_file)?;
        let token = oauth::valid_token(&self.client, &secret, &self.config.token_file).await?;

        let request = SendRequest {
            raw: encode_raw_message(&self.config.user, body),
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&token.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AlertError::EmailDelivery(format!("unable to send email via Gmail API: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Gmail rejected message");
            return Err(AlertError::EmailDelivery(format!(
                "unable to send email via Gmail API: HTTP {}",
                status.as_u16()
            )));
        }

        tracing::info!("Gmail API push succeeded");
        Ok(())
    }
}

/// Minimal RFC 822 document: recipient, subject, blank line, body.
#[must_use]
pub fn rfc822_message(to: &str, body: &str) -> String {
    format!("To: {to}\r\nSubject: {SUBJECT}\r\n\r\n{body}")
}

/// The message in the URL-safe base64 form the `raw` field expects.
#[must_use]
pub fn encode_raw_message(to: &str, body: &str) -> String {
    URL_SAFE.encode(rfc822_message(to, body))
}
