//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that every provider adapter
//! implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, Quote};

/// Trait for market data provider adapters.
///
/// An adapter owns everything provider-specific: building the request
/// (headers, query parameters, auth), parsing the provider's success and
/// error shapes, and mapping them into a [`Quote`] or a classified
/// [`MarketDataError`]. It must not retry and must not call the rate limiter;
/// both belong to the caller.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use finsight_market_data::provider::QuoteProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn asset_classes(&self) -> &'static [AssetClass] {
///         &[AssetClass::Equity]
///     }
///
///     async fn fetch_quote(&self, identifier: &str) -> Result<Quote, MarketDataError> {
///         // ... one request, one parse
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "NSE", "CAMS", etc. Used for rate
    /// limiting, logging and as the quote's provenance tag.
    fn id(&self) -> &'static str;

    /// Asset classes this provider can price.
    fn asset_classes(&self) -> &'static [AssetClass];

    /// Fetch the latest quote for a symbol or scheme code.
    ///
    /// # Returns
    ///
    /// The canonical quote on success, or a transient/permanent
    /// `MarketDataError` on failure.
    async fn fetch_quote(&self, identifier: &str) -> Result<Quote, MarketDataError>;
}
