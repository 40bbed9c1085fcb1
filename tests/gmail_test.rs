//! Integration tests for Gmail delivery and OAuth token handling.

mod common;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use ampwatch::error::AlertError;
use ampwatch::notify::GmailNotifier;

use common::fixtures::{GMAIL_SEND_PATH, MockEnv, TOKEN_PATH, expired_token_json};
use common::logger::TestLogger;

fn decode_raw(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    let raw = json["raw"].as_str().unwrap();
    String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
}

#[tokio::test]
async fn sends_raw_message_with_bearer_token() {
    let log = TestLogger::new("sends_raw_message_with_bearer_token");
    log.phase("setup");

    let env = MockEnv::start().await;
    env.install_gmail_credentials();
    Mock::given(method("POST"))
        .and(path(GMAIL_SEND_PATH))
        .and(header("authorization", "Bearer ya29.fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m1"})))
        .expect(1)
        .mount(&env.server)
        .await;

    log.phase("execute");
    let notifier = GmailNotifier::new(&env.config.email).unwrap();
    notifier
        .send("Warning: Exceeded limit by 20.00!")
        .await
        .unwrap();

    log.phase("verify");
    let bodies = env.bodies_for(GMAIL_SEND_PATH).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        decode_raw(&bodies[0]),
        "To: alerts@example.com\r\nSubject: Electricity Alert\r\n\r\nWarning: Exceeded limit by 20.00!"
    );
    log.finish_ok();
}

#[tokio::test]
async fn expired_token_is_refreshed_in_memory() {
    let env = MockEnv::start().await;
    env.install_gmail_credentials();
    env.dir.create_file("token.json", &expired_token_json());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.renewed",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("POST"))
        .and(path(GMAIL_SEND_PATH))
        .and(header("authorization", "Bearer ya29.renewed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let notifier = GmailNotifier::new(&env.config.email).unwrap();
    notifier.send("Warning: Remaining electricity is low: 1.00").await.unwrap();

    // The cached file is left as it was.
    let on_disk = env.dir.read_file("token.json").unwrap();
    assert!(on_disk.contains("ya29.stale"));
}

#[tokio::test]
async fn rejected_refresh_is_auth_error() {
    let env = MockEnv::start().await;
    env.install_gmail_credentials();
    env.dir.create_file("token.json", &expired_token_json());
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .mount(&env.server)
        .await;

    let notifier = GmailNotifier::new(&env.config.email).unwrap();
    let err = notifier.send("body").await.unwrap_err();

    assert!(matches!(err, AlertError::AuthInvalid(_)), "got {err:?}");
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn missing_token_file_points_at_setup_flag() {
    let env = MockEnv::start().await;
    env.install_gmail_credentials();
    std::fs::remove_file(env.dir.file_path("token.json")).unwrap();

    let notifier = GmailNotifier::new(&env.config.email).unwrap();
    let err = notifier.send("body").await.unwrap_err();

    assert!(matches!(err, AlertError::AuthNotConfigured { .. }));
    assert!(err.to_string().contains("--authorize-email"));
}

#[tokio::test]
async fn gmail_rejection_is_email_delivery_error() {
    let env = MockEnv::start().await;
    env.install_gmail_credentials();
    env.mount_gmail(500).await;

    let notifier = GmailNotifier::new(&env.config.email).unwrap();
    let err = notifier.send("body").await.unwrap_err();

    assert!(matches!(err, AlertError::EmailDelivery(_)));
}
