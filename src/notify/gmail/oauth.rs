//! Google OAuth 2.0 client-secret and token handling for the Gmail channel.
//!
//! The send path only ever reads the cached token and refreshes it in memory.
//! Writing a token happens once, during `--authorize-email` setup.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};

/// Scope needed to send mail and nothing else.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const AUTH_STATE: &str = "state-token";

/// Tokens are treated as expired this many seconds before their stated expiry.
const EXPIRY_DELTA_SECS: i64 = 10;

// =============================================================================
// Client Secret
// =============================================================================

/// The `credentials.json` downloaded from the Google Cloud console.
#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// OAuth client registration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    /// Read and parse a client secret file.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsFile` if the path is unset, unreadable, or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(AlertError::CredentialsFile {
                path: String::new(),
                message: "Email.CredentialsFile is not configured".to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| AlertError::CredentialsFile {
            path: path.display().to_string(),
            message: format!("unable to read credentials file: {e}"),
        })?;
        Self::from_json(&content).map_err(|message| AlertError::CredentialsFile {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse the `installed` or `web` client block.
    ///
    /// # Errors
    ///
    /// Returns a description of what is wrong with the document.
    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(content)
            .map_err(|e| format!("unable to parse client secret file: {e}"))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "missing \"installed\" or \"web\" client block".to_string())
    }

    /// Redirect URI registered for the installed-app flow.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map_or(OOB_REDIRECT_URI, String::as_str)
    }

    /// Consent page URL for offline access to the send scope.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsFile` if `auth_uri` is not a valid URL.
    pub fn authorization_url(&self) -> Result<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", GMAIL_SEND_SCOPE),
                ("state", AUTH_STATE),
            ],
        )
        .map_err(|e| AlertError::CredentialsFile {
            path: String::new(),
            message: format!("invalid auth_uri '{}': {e}", self.auth_uri),
        })
    }

    /// Trade an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if the token endpoint rejects the code.
    pub async fn exchange_code(&self, client: &Client, code: &str) -> Result<OAuthToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.trim()),
            ("redirect_uri", self.redirect_uri()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let response = self.token_request(client, &params).await?;
        Ok(response.into_token(None))
    }

    /// Obtain a fresh access token from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if the token has no refresh token or the refresh
    /// is rejected.
    pub async fn refresh(&self, client: &Client, token: &OAuthToken) -> Result<OAuthToken> {
        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            AlertError::AuthInvalid(
                "token expired and has no refresh_token; run `ampwatch --authorize-email`"
                    .to_string(),
            )
        })?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let response = self.token_request(client, &params).await?;
        Ok(response.into_token(Some(refresh_token)))
    }

    async fn token_request(
        &self,
        client: &Client,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse> {
        let response = client
            .post(&self.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| AlertError::AuthInvalid(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::AuthInvalid(format!(
                "token endpoint returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AlertError::AuthInvalid(format!("unparseable token response: {e}")))
    }
}

// =============================================================================
// Token
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<&str>) -> OAuthToken {
        OAuthToken {
            access_token: self.access_token,
            token_type: if self.token_type.is_empty() {
                "Bearer".to_string()
            } else {
                self.token_type
            },
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            // Out-of-range lifetimes are treated as no expiry at all.
            expiry: self
                .expires_in
                .filter(|secs| *secs > 0)
                .and_then(TimeDelta::try_seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime)),
        }
    }
}

/// Cached OAuth token, in the JSON shape Google's client libraries write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl OAuthToken {
    /// Whether the token needs a refresh before use at `now`.
    ///
    /// A missing or zero (`0001-01-01`) expiry means the token never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if expiry.year() > 1 => {
                expiry - TimeDelta::seconds(EXPIRY_DELTA_SECS) <= now
            }
            _ => false,
        }
    }

    /// Usable without a refresh.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(Utc::now())
    }

    /// Read the cached token.
    ///
    /// # Errors
    ///
    /// Returns `AuthNotConfigured` if the file does not exist, or
    /// `AuthInvalid` if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() || !path.exists() {
            return Err(AlertError::AuthNotConfigured {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AlertError::AuthInvalid(format!("unable to parse token file: {e}")))
    }

    /// Write the token, readable by the owner only on Unix.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(self)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        std::io::Write::write_all(&mut file, json.as_bytes())?;

        tracing::info!(path = %path.display(), "Saved OAuth token");
        Ok(())
    }
}

/// Load the cached token and refresh it in memory if it has expired.
///
/// The refreshed token is not written back.
///
/// # Errors
///
/// Propagates `AuthNotConfigured` and `AuthInvalid` from loading and refreshing.
pub async fn valid_token(client: &Client, secret: &ClientSecret, path: &Path) -> Result<OAuthToken> {
    let token = OAuthToken::load(path)?;
    if token.is_valid() {
        return Ok(token);
    }

    tracing::debug!("Cached OAuth token expired, refreshing");
    secret.refresh(client, &token).await
}
