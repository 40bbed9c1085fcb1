//! Usage sample, classification, and the notification message.

use serde::{Deserialize, Serialize};

/// Remaining quota at or below this value triggers a low warning.
pub const WARNING_THRESHOLD: f64 = 20.0;

// =============================================================================
// Wire Types
// =============================================================================

/// Request body sent to the usage API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRequest {
    pub text: String,
    pub campus: String,
    pub source: String,
    pub id: i64,
    pub build: String,
    pub room: String,
    pub room_id: String,
    pub lang: String,
    pub terminal: String,
}

/// Response body returned by the usage API.
///
/// `status` and `rel` are part of the schema but do not gate classification.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UsageResponse {
    #[serde(default)]
    pub status: i64,
    pub data: UsageSample,
    #[serde(default)]
    pub rel: bool,
}

// =============================================================================
// Usage Sample
// =============================================================================

/// One reading of the meter.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageSample {
    pub used_amp: f64,
    pub all_amp: f64,
}

impl UsageSample {
    #[must_use]
    pub const fn new(used_amp: f64, all_amp: f64) -> Self {
        Self { used_amp, all_amp }
    }

    /// Quota left before cutoff. Negative once the allowance is exceeded.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.all_amp - self.used_amp
    }

    #[must_use]
    pub fn classify(&self) -> Classification {
        Classification::from_remaining(self.remaining())
    }

    /// Classify and format into the message handed to the notifiers.
    #[must_use]
    pub fn to_message(&self) -> NotificationMessage {
        NotificationMessage::from_remaining(self.remaining())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Where the remaining quota sits relative to [`WARNING_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Remaining quota is negative.
    Exceeded,
    /// Remaining quota is in `[0, WARNING_THRESHOLD]`.
    LowWarning,
    Normal,
}

impl Classification {
    #[must_use]
    pub fn from_remaining(remaining: f64) -> Self {
        if remaining < 0.0 {
            Self::Exceeded
        } else if remaining <= WARNING_THRESHOLD {
            Self::LowWarning
        } else {
            Self::Normal
        }
    }

    /// Whether the email channel should be used as well.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Exceeded | Self::LowWarning)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exceeded => "exceeded",
            Self::LowWarning => "low_warning",
            Self::Normal => "normal",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Notification Message
// =============================================================================

/// Formatted alert text plus the classification it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub classification: Classification,
    pub remaining: f64,
    pub text: String,
}

impl NotificationMessage {
    #[must_use]
    pub fn from_remaining(remaining: f64) -> Self {
        let classification = Classification::from_remaining(remaining);
        let text = match classification {
            Classification::Exceeded => format!("Warning: Exceeded limit by {:.2}!", -remaining),
            Classification::LowWarning => {
                format!("Warning: Remaining electricity is low: {remaining:.2}")
            }
            Classification::Normal => format!("Remaining electricity: {remaining:.2}"),
        };
        Self {
            classification,
            remaining,
            text,
        }
    }

    #[must_use]
    pub const fn is_warning(&self) -> bool {
        self.classification.is_warning()
    }
}

impl std::fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
