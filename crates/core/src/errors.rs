//! Core error types for the Finsight sync layer.
//!
//! Provider failures stay inside the sync report; only configuration problems
//! and market-data errors raised outside a sync cycle surface as [`Error`].

use thiserror::Error;

use finsight_market_data::{ErrorKind, MarketDataError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfigValue { key: String, message: String },

    #[error("Portfolio {0} does not fit in a decimal")]
    ValuationOverflow(&'static str),
}

impl Error {
    pub(crate) fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// True when the error should abort startup rather than be retried.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::MarketData(e) => e.kind() == ErrorKind::Configuration,
            Self::InvalidConfigValue { .. } => true,
            Self::ValuationOverflow(_) => false,
        }
    }

    /// The market data taxonomy bucket; configuration for local config errors
    /// and permanent for values that cannot be represented.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MarketData(e) => e.kind(),
            Self::InvalidConfigValue { .. } => ErrorKind::Configuration,
            Self::ValuationOverflow(_) => ErrorKind::Permanent,
        }
    }
}
