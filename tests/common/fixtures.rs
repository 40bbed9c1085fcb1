//! Mock-server fixtures for integration tests.
//!
//! A single `wiremock` server stands in for all three remote services:
//!
//! | Service   | Path                                   |
//! |-----------|----------------------------------------|
//! | usage API | `POST /api`                            |
//! | Telegram  | `POST /bot123:abc/sendMessage`         |
//! | Gmail     | `POST /gmail/v1/users/me/messages/send`|
//! | OAuth     | `POST /token`                          |
//!
//! ```rust,ignore
//! let env = MockEnv::start().await;
//! env.mount_usage(85.0, 100.0).await;
//! env.mount_telegram(200).await;
//! let report = ampwatch::cli::run::execute(&env.config).await?;
//! ```

#![allow(dead_code)]

use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ampwatch::storage::Config;
use ampwatch::test_utils::{TestDir, make_test_config};

pub const USAGE_PATH: &str = "/api";
pub const TELEGRAM_PATH: &str = "/bot123:abc/sendMessage";
pub const GMAIL_SEND_PATH: &str = "/gmail/v1/users/me/messages/send";
pub const TOKEN_PATH: &str = "/token";

/// Usage API response body.
#[must_use]
pub fn usage_body(used_amp: f64, all_amp: f64) -> Value {
    json!({
        "status": 1,
        "data": {"usedAmp": used_amp, "allAmp": all_amp},
        "rel": true
    })
}

/// `credentials.json` with its token endpoint on `base`.
#[must_use]
pub fn client_secret_json(base: &str) -> String {
    json!({
        "installed": {
            "client_id": "cid.apps.googleusercontent.com",
            "client_secret": "shh",
            "auth_uri": format!("{base}/auth"),
            "token_uri": format!("{base}{TOKEN_PATH}"),
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
        }
    })
    .to_string()
}

/// Token file that is valid for another hour.
#[must_use]
pub fn fresh_token_json() -> String {
    json!({
        "access_token": "ya29.fresh",
        "token_type": "Bearer",
        "refresh_token": "1//refresh",
        "expiry": (Utc::now() + TimeDelta::hours(1)).to_rfc3339()
    })
    .to_string()
}

/// Token file that expired an hour ago.
#[must_use]
pub fn expired_token_json() -> String {
    json!({
        "access_token": "ya29.stale",
        "token_type": "Bearer",
        "refresh_token": "1//refresh",
        "expiry": (Utc::now() - TimeDelta::hours(1)).to_rfc3339()
    })
    .to_string()
}

/// One mock server, one temp dir, and a config wired to both.
pub struct MockEnv {
    pub server: MockServer,
    pub dir: TestDir,
    pub config: Config,
}

impl MockEnv {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let dir = TestDir::new();
        let config = make_test_config(&server.uri(), dir.path());
        Self {
            server,
            dir,
            config,
        }
    }

    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Write credentials and a valid cached token.
    pub fn install_gmail_credentials(&self) {
        self.dir
            .create_file("credentials.json", &client_secret_json(&self.uri()));
        self.dir.create_file("token.json", &fresh_token_json());
    }

    /// Write the config document to `config.json` and return its path.
    #[must_use]
    pub fn write_config(&self) -> std::path::PathBuf {
        let json = serde_json::to_string_pretty(&self.config).unwrap();
        self.dir.create_file("config.json", &json);
        self.dir.file_path("config.json")
    }

    pub async fn mount_usage(&self, used_amp: f64, all_amp: f64) {
        Mock::given(method("POST"))
            .and(path(USAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(usage_body(used_amp, all_amp)))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_usage_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(USAGE_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_telegram(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(TELEGRAM_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status == 200})))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_gmail(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(GMAIL_SEND_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": "msg-1"})))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received on `request_path`, as UTF-8.
    pub async fn bodies_for(&self, request_path: &str) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect()
    }

    /// Form fields of the Telegram pushes, in order.
    pub async fn telegram_texts(&self) -> Vec<String> {
        self.bodies_for(TELEGRAM_PATH)
            .await
            .iter()
            .filter_map(|body| form_field(body, "text"))
            .collect()
    }
}

/// Decode one field from an `application/x-www-form-urlencoded` body.
#[must_use]
pub fn form_field(body: &str, name: &str) -> Option<String> {
    let url = reqwest::Url::parse(&format!("http://form.invalid/?{body}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
