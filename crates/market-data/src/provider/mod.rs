//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all adapters implement
//! - Shared HTTP plumbing and error classification
//! - Concrete adapters for exchanges, fund registrars and crypto
//! - `build_provider`, which turns a `ProviderConfig` into an adapter
//!
//! Adapters receive the bare identifier (symbol, scheme code or coin id).
//! Rate limiting, fallback and validation happen in the registry module, not
//! in the adapters themselves.

mod http;
mod traits;

pub mod alpha_vantage;
pub mod bse;
pub mod cams;
pub mod coingecko;
pub mod kfintech;
pub mod mfapi;
pub mod nse;

use std::sync::Arc;

pub use traits::QuoteProvider;

use crate::errors::MarketDataError;
use crate::models::{ProviderConfig, RateLimit};

pub use alpha_vantage::AlphaVantageProvider;
pub use bse::BseProvider;
pub use cams::CamsProvider;
pub use coingecko::CoinGeckoProvider;
pub use kfintech::KfintechProvider;
pub use mfapi::MfapiProvider;
pub use nse::NseProvider;

/// Every provider id `build_provider` understands.
pub const KNOWN_PROVIDERS: [&str; 7] = [
    nse::PROVIDER_ID,
    bse::PROVIDER_ID,
    alpha_vantage::PROVIDER_ID,
    cams::PROVIDER_ID,
    kfintech::PROVIDER_ID,
    mfapi::PROVIDER_ID,
    coingecko::PROVIDER_ID,
];

/// Adapter settings that are not part of `ProviderConfig`.
#[derive(Clone, Debug)]
pub struct ProviderOptions {
    /// Quote currency for crypto prices.
    pub crypto_vs_currency: String,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            crypto_vs_currency: coingecko::DEFAULT_VS_CURRENCY.to_string(),
        }
    }
}

/// Default endpoint and quota for a known provider id.
///
/// Quotas follow each provider's published free tier.
pub fn default_config(id: &str) -> Result<ProviderConfig, MarketDataError> {
    let (id, base_url, rate_limit) = match id {
        nse::PROVIDER_ID => (nse::PROVIDER_ID, nse::DEFAULT_BASE_URL, RateLimit::per_second(3.0)),
        bse::PROVIDER_ID => (bse::PROVIDER_ID, bse::DEFAULT_BASE_URL, RateLimit::per_second(2.0)),
        alpha_vantage::PROVIDER_ID => (
            alpha_vantage::PROVIDER_ID,
            alpha_vantage::DEFAULT_BASE_URL,
            RateLimit::per_minute(5.0),
        ),
        cams::PROVIDER_ID => (cams::PROVIDER_ID, cams::DEFAULT_BASE_URL, RateLimit::per_second(2.0)),
        kfintech::PROVIDER_ID => (
            kfintech::PROVIDER_ID,
            kfintech::DEFAULT_BASE_URL,
            RateLimit::per_second(2.0),
        ),
        mfapi::PROVIDER_ID => (mfapi::PROVIDER_ID, mfapi::DEFAULT_BASE_URL, RateLimit::per_second(5.0)),
        coingecko::PROVIDER_ID => (
            coingecko::PROVIDER_ID,
            coingecko::DEFAULT_BASE_URL,
            RateLimit::per_minute(30.0),
        ),
        other => return Err(MarketDataError::UnknownProvider(other.to_string())),
    };
    Ok(ProviderConfig::new(id, base_url, rate_limit))
}

/// Construct the adapter for `config.id`.
///
/// Fails fast with a configuration error for an unknown id or a missing
/// required credential.
pub fn build_provider(
    config: &ProviderConfig,
    options: &ProviderOptions,
) -> Result<Arc<dyn QuoteProvider>, MarketDataError> {
    let provider: Arc<dyn QuoteProvider> = match config.id.as_ref() {
        nse::PROVIDER_ID => Arc::new(NseProvider::new(config)?),
        bse::PROVIDER_ID => Arc::new(BseProvider::new(config)?),
        alpha_vantage::PROVIDER_ID => Arc::new(AlphaVantageProvider::new(config)?),
        cams::PROVIDER_ID => Arc::new(CamsProvider::new(config)?),
        kfintech::PROVIDER_ID => Arc::new(KfintechProvider::new(config)?),
        mfapi::PROVIDER_ID => Arc::new(MfapiProvider::new(config)?),
        coingecko::PROVIDER_ID => Arc::new(
            CoinGeckoProvider::new(config)?.with_vs_currency(&options.crypto_vs_currency),
        ),
        other => return Err(MarketDataError::UnknownProvider(other.to_string())),
    };
    Ok(provider)
}
