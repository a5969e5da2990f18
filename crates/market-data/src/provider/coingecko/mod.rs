//! CoinGecko crypto price provider.
//!
//! Uses `/simple/price` keyed by CoinGecko coin id (`bitcoin`, `ethereum`).
//! The demo API key is optional; without it the public tier applies.

use std::borrow::Cow;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::http::{self, decimal_from_f64, missing_field};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "COINGECKO";
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_VS_CURRENCY: &str = "inr";

/// CoinGecko adapter quoting against a single fiat currency.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
            api_key: config.api_key.clone(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
        })
    }

    /// Quote currency, lowercase ISO code as CoinGecko expects it.
    pub fn with_vs_currency(mut self, vs_currency: &str) -> Self {
        let vs_currency = vs_currency.trim().to_ascii_lowercase();
        if !vs_currency.is_empty() {
            self.vs_currency = vs_currency;
        }
        self
    }

    pub fn vs_currency(&self) -> &str {
        &self.vs_currency
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::Crypto]
    }

    async fn fetch_quote(&self, coin_id: &str) -> Result<Quote, MarketDataError> {
        let coin_id = coin_id.trim().to_ascii_lowercase();
        debug!("Fetching {} price in {} from CoinGecko", coin_id, self.vs_currency);

        let mut request = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[
                ("ids", coin_id.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
                ("include_last_updated_at", "true"),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let body = http::send(PROVIDER_ID, request).await?;
        parse_quote(&coin_id, &self.vs_currency, &body)
    }
}

/// Parse `{"bitcoin": {"inr": 5612345.0, "inr_24h_change": 1.2, ...}}`.
fn parse_quote(coin_id: &str, vs_currency: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: HashMap<String, HashMap<String, Value>> = http::parse_json(PROVIDER_ID, body)?;

    // Unknown ids are silently dropped from the map.
    let Some(fields) = response.get(coin_id) else {
        return Err(MarketDataError::SymbolNotFound {
            provider: Cow::Borrowed(PROVIDER_ID),
            symbol: coin_id.to_string(),
        });
    };

    let number = |key: &str| fields.get(key).and_then(Value::as_f64).and_then(decimal_from_f64);

    let price = number(vs_currency).ok_or_else(|| missing_field(PROVIDER_ID, vs_currency))?;
    let change_percent = number(&format!("{}_24h_change", vs_currency)).map(|p| p.round_dp(4));
    let volume = number(&format!("{}_24h_vol", vs_currency));

    let timestamp = fields
        .get("last_updated_at")
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Ok(Quote::new(coin_id, price, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_change(None, change_percent)
        .with_volume(volume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateLimit;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_simple_price() {
        let json = r#"{
            "bitcoin": {
                "inr": 5612345.5,
                "inr_24h_vol": 1234567890.25,
                "inr_24h_change": 1.234567,
                "last_updated_at": 1729245600
            }
        }"#;
        let quote = parse_quote("bitcoin", "inr", json).unwrap();
        assert_eq!(quote.symbol, "bitcoin");
        assert_eq!(quote.price, dec!(5612345.5));
        assert_eq!(quote.change_percent, Some(dec!(1.2346)));
        assert_eq!(quote.volume, Some(dec!(1234567890.25)));
        assert_eq!(quote.timestamp.timestamp(), 1729245600);
        assert_eq!(quote.provider, "COINGECKO");
    }

    #[test]
    fn test_unknown_coin_is_symbol_not_found() {
        let err = parse_quote("notacoin", "inr", "{}").unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_missing_currency_is_malformed() {
        let err = parse_quote("bitcoin", "inr", r#"{"bitcoin": {"usd": 67000}}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_api_key_is_optional() {
        let config = ProviderConfig::new(PROVIDER_ID, DEFAULT_BASE_URL, RateLimit::per_minute(30.0));
        let provider = CoinGeckoProvider::new(&config).unwrap().with_vs_currency(" USD ");
        assert_eq!(provider.vs_currency(), "usd");
    }
}
