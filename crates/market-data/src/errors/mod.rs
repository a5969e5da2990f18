//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`ErrorKind`]: The four-way taxonomy used by callers to decide what to do
//! - [`ProviderAttempt`]: One failed adapter call inside a fallback chain

mod kind;

pub use kind::ErrorKind;

use thiserror::Error;

use crate::models::ProviderId;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into an [`ErrorKind`] via the [`kind`](Self::kind)
/// method. Configuration errors only happen while wiring providers together;
/// every other kind can be produced during a sync cycle.
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    /// A provider needs a credential that was not configured.
    #[error("Missing credential for {provider}: {credential}")]
    MissingCredential {
        provider: ProviderId,
        credential: &'static str,
    },

    /// A rate limit that is zero, negative or not a number.
    #[error("Invalid rate limit for {provider}: {value}")]
    InvalidRateLimit { provider: ProviderId, value: String },

    /// A provider id that no adapter or limiter knows about.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Any other configuration value that cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout { provider: ProviderId },

    /// The provider throttled us (HTTP 429 or a throttling message in the body).
    #[error("Rate limited: {provider}")]
    RateLimited { provider: ProviderId },

    /// The provider answered with a 5xx status.
    #[error("Server error from {provider}: HTTP {status} - {message}")]
    ServerError {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    /// The connection failed before a response arrived.
    #[error("Network error from {provider}: {message}")]
    Network { provider: ProviderId, message: String },

    /// The provider does not know this symbol or scheme code.
    #[error("Symbol not found at {provider}: {symbol}")]
    SymbolNotFound { provider: ProviderId, symbol: String },

    /// The provider rejected our credentials (HTTP 401/403).
    #[error("Unauthorized at {provider}: {message}")]
    Unauthorized { provider: ProviderId, message: String },

    /// Any other 4xx answer.
    #[error("Request rejected by {provider}: HTTP {status} - {message}")]
    ClientError {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    /// The body did not match the provider's documented shape, or the
    /// resulting quote failed validation.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse { provider: ProviderId, message: String },

    /// The investment carries no symbol or scheme code to look up.
    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    /// Every adapter in a fallback chain failed. Attempts are kept in the
    /// order the adapters were tried.
    #[error("All providers exhausted: {}", summarize_attempts(.attempts))]
    AllProvidersExhausted { attempts: Vec<ProviderAttempt> },
}

/// A single failed adapter call recorded by the fallback resolver.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub error: MarketDataError,
}

fn summarize_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl MarketDataError {
    /// Returns the taxonomy bucket for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::borrow::Cow;
    /// use finsight_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: Cow::Borrowed("NSE") };
    /// assert_eq!(error.kind(), ErrorKind::Transient);
    ///
    /// let error = MarketDataError::SymbolNotFound {
    ///     provider: Cow::Borrowed("NSE"),
    ///     symbol: "INVALID".to_string(),
    /// };
    /// assert_eq!(error.kind(), ErrorKind::Permanent);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. }
            | Self::InvalidRateLimit { .. }
            | Self::UnknownProvider(_)
            | Self::InvalidConfig(_) => ErrorKind::Configuration,

            Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::ServerError { .. }
            | Self::Network { .. } => ErrorKind::Transient,

            Self::SymbolNotFound { .. }
            | Self::Unauthorized { .. }
            | Self::ClientError { .. }
            | Self::MalformedResponse { .. }
            | Self::MissingIdentifier(_) => ErrorKind::Permanent,

            Self::AllProvidersExhausted { .. } => ErrorKind::AllProvidersExhausted,
        }
    }

    /// Whether a later sync cycle has a reasonable chance of succeeding.
    ///
    /// Exhaustion is retryable when at least one underlying failure was transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AllProvidersExhausted { attempts } => {
                attempts.iter().any(|a| a.error.is_retryable())
            }
            other => other.kind() == ErrorKind::Transient,
        }
    }

    /// The underlying per-adapter failures, empty for anything but exhaustion.
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::AllProvidersExhausted { attempts } => attempts,
            _ => &[],
        }
    }
}
