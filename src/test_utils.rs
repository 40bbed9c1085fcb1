//! Test utilities for ampwatch.
//!
//! Provides shared helpers, config factories, and assertion macros
//! for use across unit and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ampwatch::test_utils::*;
//!
//! let dir = TestDir::new();
//! dir.create_file("config/config.json", &make_test_config_json());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use crate::storage::{Config, EmailConfig, RequestConfig, RetryConfig, TelegramConfig};

// =============================================================================
// Config Factories
// =============================================================================

/// A complete config document with every section filled in.
#[must_use]
pub fn make_test_config_json() -> String {
    r#"{
  "Telegram": {
    "BotToken": "123:abc",
    "UserID": "42",
    "APIHost": "api.telegram.org",
    "Proxy": ""
  },
  "Email": {
    "CredentialsFile": "config/credentials.json",
    "TokenFile": "config/token.json",
    "User": "alerts@example.com"
  },
  "RequestData": {
    "API": "https://power.example.edu/api/getRoomInfo",
    "Headers": {"Content-Type": "application/json"},
    "Text": "room",
    "Campus": "SZ",
    "Source": "app",
    "ID": 7,
    "Build": "B3",
    "Room": "101",
    "RoomID": "R-101",
    "Lang": "en",
    "Terminal": "web"
  },
  "Retry": {"MaxAttempts": 5, "DelaySeconds": 5}
}"#
    .to_string()
}

/// `RequestData` section aimed at `api`, over plain TLS settings.
#[must_use]
pub fn make_test_request_config(api: &str) -> RequestConfig {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    RequestConfig {
        api: api.to_string(),
        headers,
        text: "room".to_string(),
        campus: "SZ".to_string(),
        source: "app".to_string(),
        id: 7,
        build: "B3".to_string(),
        room: "101".to_string(),
        room_id: "R-101".to_string(),
        lang: "en".to_string(),
        terminal: "web".to_string(),
        insecure_tls: false,
    }
}

/// `Telegram` section pointed at `api_host` (a bare host or a base URL).
#[must_use]
pub fn make_test_telegram_config(api_host: &str) -> TelegramConfig {
    TelegramConfig {
        bot_token: "123:abc".to_string(),
        user_id: "42".to_string(),
        api_host: api_host.to_string(),
        proxy: String::new(),
    }
}

/// Full config for a mock server: usage API at `{base}/api`, Telegram at
/// `base`, Gmail at `base`, and retries with no delay.
///
/// Credential paths live under `dir`; nothing is written there.
#[must_use]
pub fn make_test_config(base: &str, dir: &Path) -> Config {
    Config {
        telegram: make_test_telegram_config(base),
        email: EmailConfig {
            credentials_file: dir.join("credentials.json"),
            token_file: dir.join("token.json"),
            user: "alerts@example.com".to_string(),
            api_base: Some(base.to_string()),
        },
        request: make_test_request_config(&format!("{base}/api")),
        retry: RetryConfig {
            max_attempts: 5,
            delay_seconds: 0,
        },
    }
}

// =============================================================================
// Test Directory
// =============================================================================

/// Isolated temporary directory that cleans up on drop.
///
/// # Examples
///
/// ```rust,ignore
/// use ampwatch::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.create_file("config/token.json", "{}");
/// assert!(dir.file_exists("config/token.json"));
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    /// Check if a file exists in the temporary directory.
    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    /// Get the full path to a file in the temporary directory.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use ampwatch::assert_contains;
///
/// assert_contains!("Remaining: 42.50", "42.50");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
    ($haystack:expr, $needle:expr, $($arg:tt)*) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            $($arg)*
        );
    };
}

/// Assert approximate floating point equality.
///
/// # Examples
///
/// ```rust,ignore
/// use ampwatch::assert_float_eq;
///
/// assert_float_eq!(70.0, 70.0000001);
/// assert_float_eq!(70.0, 70.05, 0.1); // Custom epsilon
/// ```
#[macro_export]
macro_rules! assert_float_eq {
    ($left:expr, $right:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = f64::EPSILON * 100.0;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = $epsilon;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
}
