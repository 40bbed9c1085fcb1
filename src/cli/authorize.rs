//! One-time Gmail authorization (`--authorize-email`).
//!
//! Prints the consent URL, reads the code the user pastes back, exchanges it,
//! and writes `Email.TokenFile`. This is the only interactive path in the
//! binary; the normal run never reads from the terminal.

use std::io::BufRead;

use crate::core::http::{self, NOTIFY_TIMEOUT};
use crate::error::{AlertError, Result};
use crate::notify::gmail::{ClientSecret, OAuthToken};
use crate::storage::EmailConfig;

/// Run the authorization flow against stdin.
///
/// # Errors
///
/// Returns credential, authorization, or I/O errors.
pub async fn execute(config: &EmailConfig) -> Result<()> {
    let stdin = std::io::stdin();
    execute_with(config, stdin.lock()).await.map(|_| ())
}

/// Run the authorization flow reading the code from `input`.
///
/// # Errors
///
/// Returns credential, authorization, or I/O errors.
pub async fn execute_with<R: BufRead>(config: &EmailConfig, input: R) -> Result<OAuthToken> {
    let secret = ClientSecret::load(&config.credentials_file)?;
    let url = secret.authorization_url()?;

    println!("Go to the following link in your browser then type the authorization code:\n{url}");

    let code = read_code(input)?;
    let client = http::build_client(NOTIFY_TIMEOUT)?;
    let token = secret.exchange_code(&client, &code).await?;

    if token.refresh_token.is_none() {
        tracing::warn!("Token endpoint returned no refresh_token; the token will stop working once it expires");
    }

    token.save(&config.token_file)?;
    println!("Saved credential file to: {}", config.token_file.display());
    Ok(token)
}

fn read_code<R: BufRead>(mut input: R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let code = line.trim();
    if code.is_empty() {
        return Err(AlertError::AuthInvalid(
            "unable to read authorization code: no input".to_string(),
        ));
    }
    Ok(code.to_string())
}
