//! Finsight Market Data Crate
//!
//! This crate fetches latest prices for investments from heterogeneous,
//! rate-limited providers and maps them into one canonical [`Quote`].
//!
//! # Overview
//!
//! The market data crate supports:
//! - Three asset classes: equities, mutual funds (NAV) and crypto
//! - Domestic exchanges (NSE, BSE), a generic quote API (Alpha Vantage),
//!   fund registrars and aggregators (CAMS, KFintech, MFAPI) and CoinGecko
//! - Minimum-interval rate limiting per provider
//! - Ordered fallback across providers with quote validation
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ProviderRegistry |  (route per asset class)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | FallbackResolver | --> |   RateLimiter    |  (acquire per attempt)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (NSE, CAMS, MFAPI, ...)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |      Quote       |  (validated, canonical)
//! +------------------+
//! ```
//!
//! # Errors
//!
//! Every failure is a [`MarketDataError`] whose [`ErrorKind`] tells the
//! caller whether it is a configuration problem, a transient or permanent
//! provider failure, or an exhausted fallback chain.

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{ErrorKind, MarketDataError, ProviderAttempt};

pub use models::{AssetClass, ProviderConfig, ProviderId, Quote, RateLimit};

pub use provider::{
    build_provider, default_config, AlphaVantageProvider, BseProvider, CamsProvider,
    CoinGeckoProvider, KfintechProvider, MfapiProvider, NseProvider, ProviderOptions,
    QuoteProvider, KNOWN_PROVIDERS,
};

pub use registry::{FallbackResolver, ProviderRegistry, QuoteValidator, RateLimiter};
