//! The default run: fetch with retries, then notify.
//!
//! Delivery policy:
//! - Chat is always attempted. On the success path a chat failure fails the run.
//! - Email is attempted for warnings and for exhausted retries. Its failures
//!   are logged and never change the outcome.

use crate::core::fetcher::UsageFetcher;
use crate::core::models::NotificationMessage;
use crate::core::retry::{self, RetryPolicy};
use crate::error::Result;
use crate::notify::{GmailNotifier, TelegramNotifier};
use crate::storage::Config;

/// Sent on both channels when the usage API never answered.
pub const RETRY_EXHAUSTED_MESSAGE: &str = "Error: Maximum retry limit reached.";

/// What happened to the best-effort email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    /// Not a warning, nothing to mail.
    Skipped,
    Sent,
    Failed(String),
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub message: NotificationMessage,
    pub attempts: u32,
    pub email: EmailOutcome,
}

/// Execute one check-and-notify cycle.
///
/// # Errors
///
/// Returns `RetryBudgetExhausted` if every fetch attempt failed, or
/// `ChatDelivery` if the chat push for a successful fetch failed. Email
/// failures never surface here.
pub async fn execute(config: &Config) -> Result<RunReport> {
    let fetcher = UsageFetcher::new(&config.request)?;
    let chat = TelegramNotifier::new(&config.telegram)?;
    let mail = GmailNotifier::new(&config.email)?;

    execute_with(&config.retry.policy(), &fetcher, &chat, &mail).await
}

/// [`execute`] with pre-built components.
///
/// # Errors
///
/// See [`execute`].
pub async fn execute_with(
    policy: &RetryPolicy,
    fetcher: &UsageFetcher,
    chat: &TelegramNotifier,
    mail: &GmailNotifier,
) -> Result<RunReport> {
    let outcome = retry::run(policy, |attempt| {
        tracing::debug!(attempt, "Fetching usage");
        fetcher.fetch()
    })
    .await;

    let attempts = outcome.attempts();
    let message = match outcome.into_result() {
        Ok(message) => message,
        Err(e) => {
            notify_exhausted(chat, mail).await;
            return Err(e);
        }
    };

    let chat_result = chat.send(&message.text).await;
    match &chat_result {
        Ok(()) => tracing::info!(message = %message, "Telegram message sent"),
        Err(e) => tracing::error!(error = %e, "Failed to send Telegram message"),
    }

    let email = if message.is_warning() {
        deliver_email(mail, &message.text).await
    } else {
        EmailOutcome::Skipped
    };

    chat_result?;

    Ok(RunReport {
        message,
        attempts,
        email,
    })
}

async fn notify_exhausted(chat: &TelegramNotifier, mail: &GmailNotifier) {
    if let Err(e) = chat.send(RETRY_EXHAUSTED_MESSAGE).await {
        tracing::error!(error = %e, "Failed to send Telegram failure notice");
    }
    deliver_email(mail, RETRY_EXHAUSTED_MESSAGE).await;
}

async fn deliver_email(mail: &GmailNotifier, text: &str) -> EmailOutcome {
    match mail.send(text).await {
        Ok(()) => {
            tracing::info!(message = %text, "Email sent");
            EmailOutcome::Sent
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to send email notification");
            EmailOutcome::Failed(e.to_string())
        }
    }
}
