//! Configuration file loading and validation.
//!
//! The config is a single JSON document with three required sections
//! (`Telegram`, `Email`, `RequestData`) and one optional section (`Retry`):
//!
//! ```json
//! {
//!   "Telegram":    {"BotToken": "...", "UserID": "...", "APIHost": "api.telegram.org", "Proxy": ""},
//!   "Email":       {"CredentialsFile": "credentials.json", "TokenFile": "token.json", "User": "me@example.com"},
//!   "RequestData": {"API": "https://...", "Headers": {}, "Text": "", "Campus": "", "Source": "",
//!                   "ID": 0, "Build": "", "Room": "", "RoomID": "", "Lang": "", "Terminal": ""},
//!   "Retry":       {"MaxAttempts": 5, "DelaySeconds": 5}
//! }
//! ```
//!
//! The loaded [`Config`] is immutable and handed to each component by reference.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;
use crate::error::{AlertError, Result};

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Default Telegram Bot API host.
pub const DEFAULT_TELEGRAM_HOST: &str = "api.telegram.org";

/// Default Gmail API base URL.
pub const DEFAULT_GMAIL_API_BASE: &str = "https://gmail.googleapis.com";

// =============================================================================
// Config Sections
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "Telegram")]
    pub telegram: TelegramConfig,

    #[serde(rename = "Email", default)]
    pub email: EmailConfig,

    #[serde(rename = "RequestData")]
    pub request: RequestConfig,

    #[serde(rename = "Retry", default)]
    pub retry: RetryConfig,
}

/// Telegram bot credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(rename = "BotToken")]
    pub bot_token: String,

    /// Chat to deliver to.
    #[serde(rename = "UserID")]
    pub user_id: String,

    /// Bare host (`api.telegram.org`) or a full base URL with scheme.
    #[serde(rename = "APIHost", default = "default_telegram_host")]
    pub api_host: String,

    /// `host:port` or a full proxy URL. Empty means environment proxy settings.
    #[serde(rename = "Proxy", default)]
    pub proxy: String,
}

fn default_telegram_host() -> String {
    DEFAULT_TELEGRAM_HOST.to_string()
}

/// Gmail credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    /// OAuth client secret JSON downloaded from the Google console.
    #[serde(rename = "CredentialsFile", default)]
    pub credentials_file: PathBuf,

    /// Cached OAuth token written by `--authorize-email`.
    #[serde(rename = "TokenFile", default)]
    pub token_file: PathBuf,

    /// Recipient address.
    #[serde(rename = "User", default)]
    pub user: String,

    #[serde(rename = "APIBase", default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl EmailConfig {
    /// Gmail API base URL, falling back to the public endpoint.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_GMAIL_API_BASE)
    }
}

/// Usage API endpoint and the account fields sent in the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(rename = "API")]
    pub api: String,

    #[serde(rename = "Headers", default)]
    pub headers: BTreeMap<String, String>,

    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Campus", default)]
    pub campus: String,
    #[serde(rename = "Source", default)]
    pub source: String,
    #[serde(rename = "ID", default)]
    pub id: i64,
    #[serde(rename = "Build", default)]
    pub build: String,
    #[serde(rename = "Room", default)]
    pub room: String,
    #[serde(rename = "RoomID", default)]
    pub room_id: String,
    #[serde(rename = "Lang", default)]
    pub lang: String,
    #[serde(rename = "Terminal", default)]
    pub terminal: String,

    /// Accept invalid certificates and cap TLS at 1.2 for the usage API.
    ///
    /// The campus endpoint has historically served an outdated TLS setup.
    /// Defaults to `true`; set `false` once the server is known to be fixed.
    #[serde(rename = "InsecureTls", default = "default_true")]
    pub insecure_tls: bool,
}

const fn default_true() -> bool {
    true
}

/// Retry budget for the usage fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(rename = "MaxAttempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(rename = "DelaySeconds", default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

const fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

const fn default_delay_seconds() -> u64 {
    RetryPolicy::DEFAULT_DELAY.as_secs()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

impl RetryConfig {
    /// Convert into the runtime retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_secs(self.delay_seconds),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Load and validate configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file doesn't exist, `ConfigParse` if the
    /// JSON is malformed, or `ConfigInvalid` if a required value is empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AlertError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content, path)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse configuration from JSON content.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` with the offending line when the JSON is malformed.
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| AlertError::ConfigParse {
            path: path.display().to_string(),
            line: Some(e.line()),
            message: e.to_string(),
        })
    }

    /// Validate values that serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("RequestData.API", self.request.api.as_str()),
            ("Telegram.BotToken", self.telegram.bot_token.as_str()),
            ("Telegram.UserID", self.telegram.user_id.as_str()),
            ("Telegram.APIHost", self.telegram.api_host.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AlertError::ConfigInvalid {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        if !self.request.api.starts_with("http://") && !self.request.api.starts_with("https://") {
            return Err(AlertError::ConfigInvalid {
                key: "RequestData.API".to_string(),
                message: format!("expected an http(s) URL, got '{}'", self.request.api),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(AlertError::ConfigInvalid {
                key: "Retry.MaxAttempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
