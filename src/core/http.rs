//! HTTP client utilities.
//!
//! Provides the client builders shared by the usage fetcher and the notifiers.

use std::time::Duration;

use reqwest::tls::Version;
use reqwest::{Client, ClientBuilder, Proxy, Response, Url};

use crate::error::{AlertError, Result};

/// Timeout for a single usage API attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for chat and email sends.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Lowest protocol version the legacy client will negotiate.
pub const LEGACY_TLS_MIN: Version = Version::TLS_1_0;

/// Highest protocol version the legacy client will negotiate.
pub const LEGACY_TLS_MAX: Version = Version::TLS_1_2;

fn base_builder(timeout: Duration) -> ClientBuilder {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("ampwatch/{}", env!("CARGO_PKG_VERSION")))
}

// Both backends are compiled in and native would otherwise be the default.
fn strict_builder(timeout: Duration) -> ClientBuilder {
    base_builder(timeout).tls_backend_rustls()
}

fn legacy_tls_builder(timeout: Duration) -> ClientBuilder {
    base_builder(timeout)
        .tls_backend_native()
        .tls_danger_accept_invalid_certs(true)
        .tls_version_min(LEGACY_TLS_MIN)
        .tls_version_max(LEGACY_TLS_MAX)
        .http1_only()
}

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    strict_builder(timeout)
        .build()
        .map_err(|e| AlertError::Network(e.to_string()))
}

/// Build a client for servers stuck on an outdated TLS setup.
///
/// Runs on the platform TLS library so TLS 1.0 and the older RSA key-exchange
/// suites stay available. Certificate and hostname verification are disabled,
/// the protocol range is [`LEGACY_TLS_MIN`] to [`LEGACY_TLS_MAX`], and HTTP/2
/// is never negotiated. Only the usage API uses this, and only when
/// `RequestData.InsecureTls` is set.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_legacy_tls_client(timeout: Duration) -> Result<Client> {
    tracing::warn!(
        "Usage API client has certificate verification disabled (RequestData.InsecureTls = true)"
    );
    legacy_tls_builder(timeout)
        .build()
        .map_err(|e| AlertError::Network(e.to_string()))
}

/// Resolve a configured proxy address.
///
/// Accepts a bare `host:port` (treated as an HTTP proxy) or a full URL.
/// Returns `None` when the address is empty or cannot be parsed, so the
/// caller falls back to the environment's proxy settings.
#[must_use]
pub fn resolve_proxy(addr: &str) -> Option<Url> {
    let addr = addr.trim();
    if addr.is_empty() {
        return None;
    }

    let candidate = if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    };

    let url = Url::parse(&candidate).ok()?;
    if url.host_str().is_none_or(str::is_empty) {
        return None;
    }
    // A bare address must name its port explicitly.
    if !addr.contains("://") && url.port().is_none() {
        return None;
    }
    Some(url)
}

/// Build a client that routes through the configured proxy.
///
/// An empty or unparseable proxy never fails the build: the client is built
/// without an explicit proxy and reqwest's environment proxy handling
/// (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`) applies instead.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_proxied_client(timeout: Duration, proxy_addr: &str) -> Result<Client> {
    let mut builder = strict_builder(timeout);

    match resolve_proxy(proxy_addr).map(|url| Proxy::all(url.as_str())) {
        Some(Ok(proxy)) => {
            tracing::debug!(proxy = %proxy_addr, "Using configured proxy");
            builder = builder.proxy(proxy);
        }
        Some(Err(e)) => {
            tracing::warn!(proxy = %proxy_addr, error = %e, "Invalid proxy, using environment settings");
        }
        None if !proxy_addr.trim().is_empty() => {
            tracing::warn!(proxy = %proxy_addr, "Unparseable proxy, using environment settings");
        }
        None => {}
    }

    builder
        .build()
        .map_err(|e| AlertError::Network(e.to_string()))
}

/// Turn a non-2xx response into `HttpStatus`, keeping the body in the log.
///
/// # Errors
///
/// Returns `HttpStatus` carrying the status code.
pub async fn ensure_success(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(service, status = status.as_u16(), body = %body, "Non-success response");
    Err(AlertError::HttpStatus {
        service: service.to_string(),
        status: status.as_u16(),
    })
}
