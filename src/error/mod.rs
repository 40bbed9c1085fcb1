//! Error types for ampwatch.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into four main categories:
//! - **Fetch**: Network, timeout, HTTP status, or decode failures from the usage API.
//!   These are transient and retried by [`crate::core::retry`].
//! - **Retry**: The retry budget ran out. Terminal.
//! - **Notification**: Chat or email delivery failures, including OAuth problems.
//! - **Configuration**: Unreadable, malformed, or invalid config files.
//!
//! Each error has a stable error code (e.g., `AMPW-F001`) for log correlation.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Usage API failures (timeout, connection, status, decode).
    Fetch,
    /// Retry budget exhausted.
    Retry,
    /// Chat or email delivery failures.
    Notification,
    /// Config file parsing, validation, or missing values.
    Configuration,
    /// Internal errors (I/O, bugs, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Fetch => "Fetch error",
            Self::Retry => "Retry error",
            Self::Notification => "Notification error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Fetch => "F",
            Self::Retry => "R",
            Self::Notification => "N",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success (including a failed best-effort email)
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Config file missing, malformed, or invalid
    ConfigError = 2,
    /// Usage API never answered within the retry budget
    RetryExhausted = 3,
    /// Chat notification for a successful fetch failed
    DeliveryFailed = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for u8 {
    fn from(code: ExitCode) -> Self {
        code as u8
    }
}

/// Main error type for ampwatch operations.
#[derive(Error, Debug)]
pub enum AlertError {
    // ==========================================================================
    // Fetch errors (Category: Fetch)
    // ==========================================================================
    /// Request timed out.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Connection-level failure (DNS, refused, TLS handshake).
    #[error("network error: {0}")]
    Network(String),

    /// Remote answered with a non-2xx status.
    #[error("{service} returned HTTP {status}")]
    HttpStatus { service: String, status: u16 },

    /// Response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    // ==========================================================================
    // Retry errors (Category: Retry)
    // ==========================================================================
    /// Every attempt within the retry budget failed.
    #[error("maximum retry limit reached after {attempts} attempt(s): {last_error}")]
    RetryBudgetExhausted {
        attempts: u32,
        last_error: Box<AlertError>,
    },

    // ==========================================================================
    // Notification errors (Category: Notification)
    // ==========================================================================
    /// Telegram push failed.
    #[error("chat delivery failed: {0}")]
    ChatDelivery(String),

    /// Gmail push failed.
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    /// OAuth client secret file missing or malformed.
    #[error("invalid credentials file {path}: {message}")]
    CredentialsFile { path: String, message: String },

    /// No cached token; the setup step has not been run.
    #[error("email authorization not configured: token file {path} not found (run `ampwatch --authorize-email`)")]
    AuthNotConfigured { path: String },

    /// Token unusable or refresh/exchange rejected.
    #[error("email authorization failed: {0}")]
    AuthInvalid(String),

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Configuration file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse {
        path: String,
        line: Option<usize>,
        message: String,
    },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AlertError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                ExitCode::ConfigError
            }

            Self::RetryBudgetExhausted { .. } => ExitCode::RetryExhausted,

            Self::ChatDelivery(_) => ExitCode::DeliveryFailed,

            Self::Timeout(_)
            | Self::Network(_)
            | Self::HttpStatus { .. }
            | Self::ParseResponse(_)
            | Self::EmailDelivery(_)
            | Self::CredentialsFile { .. }
            | Self::AuthNotConfigured { .. }
            | Self::AuthInvalid(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::HttpStatus { .. } | Self::ParseResponse(_) => {
                ErrorCategory::Fetch
            }

            Self::RetryBudgetExhausted { .. } => ErrorCategory::Retry,

            Self::ChatDelivery(_)
            | Self::EmailDelivery(_)
            | Self::CredentialsFile { .. }
            | Self::AuthNotConfigured { .. }
            | Self::AuthInvalid(_) => ErrorCategory::Notification,

            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }

            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for log correlation.
    ///
    /// Format: `AMPW-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "AMPW-F001",
            Self::Network(_) => "AMPW-F002",
            Self::HttpStatus { .. } => "AMPW-F003",
            Self::ParseResponse(_) => "AMPW-F004",

            Self::RetryBudgetExhausted { .. } => "AMPW-R001",

            Self::ChatDelivery(_) => "AMPW-N001",
            Self::EmailDelivery(_) => "AMPW-N002",
            Self::CredentialsFile { .. } => "AMPW-N010",
            Self::AuthNotConfigured { .. } => "AMPW-N011",
            Self::AuthInvalid(_) => "AMPW-N012",

            Self::ConfigNotFound { .. } => "AMPW-C001",
            Self::ConfigParse { .. } => "AMPW-C002",
            Self::ConfigInvalid { .. } => "AMPW-C003",

            Self::Io(_) => "AMPW-X001",
            Self::Json(_) => "AMPW-X002",
            Self::Other(_) => "AMPW-X099",
        }
    }

    /// Returns whether the error is worth another attempt against the usage API.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Fetch)
    }

    /// Map a reqwest transport error into the fetch taxonomy.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if err.is_decode() {
            Self::ParseResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for ampwatch operations.
pub type Result<T> = std::result::Result<T, AlertError>;
