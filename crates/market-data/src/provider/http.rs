//! Shared HTTP plumbing for provider adapters.
//!
//! Adapters build their own requests; this module sends them and turns
//! transport failures and non-success statuses into classified errors, so
//! every adapter maps HTTP 429 / 5xx / 4xx the same way.

use std::borrow::Cow;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::MarketDataError;

/// Default HTTP request timeout. The orchestrator enforces its own per-item
/// timeout on top of this.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-like user agent; the exchange endpoints reject bare clients.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build the HTTP client used by one adapter.
pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and return the body of a successful response.
pub(crate) async fn send(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<String, MarketDataError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, &e))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(provider, &e))?;

    debug!("{} responded with HTTP {} ({} bytes)", provider, status, body.len());

    if status.is_success() {
        Ok(body)
    } else {
        Err(classify_status(provider, status, &body))
    }
}

fn transport_error(provider: &'static str, error: &reqwest::Error) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout {
            provider: Cow::Borrowed(provider),
        }
    } else if error.is_decode() {
        MarketDataError::MalformedResponse {
            provider: Cow::Borrowed(provider),
            message: format!("Failed to read response: {}", error),
        }
    } else {
        MarketDataError::Network {
            provider: Cow::Borrowed(provider),
            message: error.to_string(),
        }
    }
}

/// Map a non-success status into the error taxonomy.
pub(crate) fn classify_status(provider: &'static str, status: StatusCode, body: &str) -> MarketDataError {
    let provider = Cow::Borrowed(provider);
    let message = truncate(body.trim(), 200);

    match status {
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited { provider },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MarketDataError::Timeout { provider }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            MarketDataError::Unauthorized { provider, message }
        }
        s if s.is_server_error() => MarketDataError::ServerError {
            provider,
            status: s.as_u16(),
            message,
        },
        s => MarketDataError::ClientError {
            provider,
            status: s.as_u16(),
            message,
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Deserialize a provider body, mapping schema mismatches to a permanent error.
pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::MalformedResponse {
        provider: Cow::Borrowed(provider),
        message: format!("Failed to parse response: {}", e),
    })
}

/// Parse a decimal sent as a string, tolerating thousands separators and `%`.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Convert a JSON float into a decimal.
pub(crate) fn decimal_from_f64(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

/// Build a `MalformedResponse` for a required field.
pub(crate) fn missing_field(provider: &'static str, field: &str) -> MarketDataError {
    MarketDataError::MalformedResponse {
        provider: Cow::Borrowed(provider),
        message: format!("Missing or invalid field '{}'", field),
    }
}
