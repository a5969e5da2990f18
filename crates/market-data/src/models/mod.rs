//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `asset_class` - Which family of providers can price an instrument
//! - `quote` - The canonical quote every adapter produces
//! - `provider_config` - Per-provider endpoint, credential and rate limit

mod asset_class;
mod provider_config;
mod quote;
mod types;

pub use asset_class::AssetClass;
pub use provider_config::{ProviderConfig, RateLimit, MAX_MIN_INTERVAL};
pub use quote::Quote;
pub use types::ProviderId;
