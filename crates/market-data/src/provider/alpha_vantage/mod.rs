//! Alpha Vantage market data provider implementation.
//!
//! Generic quote API used for tickers the domestic exchanges do not list
//! (e.g. `AAPL`, `RELIANCE.BSE`). Uses the `GLOBAL_QUOTE` function.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute, and it
//! reports throttling and bad symbols inside a 200 response body.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::http::{self, missing_field, parse_decimal};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "ALPHA_VANTAGE";
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

/// Alpha Vantage adapter. Requires an API key.
pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    /// Fails with a configuration error when no API key is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
            api_key: config.require_api_key("api key")?,
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::Equity]
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = symbol.trim();
        debug!("Fetching latest quote for {} from Alpha Vantage", symbol);

        let request = self.client.get(format!("{}/query", self.base_url)).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ]);

        let body = http::send(PROVIDER_ID, request).await?;
        parse_quote(symbol, &body)
    }
}

/// Check for API-level errors reported inside a successful response.
fn check_api_error(response: &GlobalQuoteResponse, symbol: &str) -> Result<(), MarketDataError> {
    if let Some(msg) = &response.error_message {
        if msg.contains("Invalid API call") || msg.contains("not found") {
            return Err(MarketDataError::SymbolNotFound {
                provider: Cow::Borrowed(PROVIDER_ID),
                symbol: symbol.to_string(),
            });
        }
        return Err(MarketDataError::ClientError {
            provider: Cow::Borrowed(PROVIDER_ID),
            status: 200,
            message: msg.clone(),
        });
    }

    for msg in [&response.note, &response.information].into_iter().flatten() {
        let lower = msg.to_lowercase();
        if lower.contains("api call frequency") || lower.contains("rate limit") {
            return Err(MarketDataError::RateLimited {
                provider: Cow::Borrowed(PROVIDER_ID),
            });
        }
        if lower.contains("apikey") || lower.contains("api key") {
            return Err(MarketDataError::Unauthorized {
                provider: Cow::Borrowed(PROVIDER_ID),
                message: msg.clone(),
            });
        }
        warn!("Alpha Vantage note: {}", msg);
    }

    Ok(())
}

fn parse_quote(symbol: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: GlobalQuoteResponse = http::parse_json(PROVIDER_ID, body)?;
    check_api_error(&response, symbol)?;

    // An unknown ticker yields `"Global Quote": {}`.
    let quote = match response.global_quote {
        Some(q) if q.price.is_some() => q,
        _ => {
            return Err(MarketDataError::SymbolNotFound {
                provider: Cow::Borrowed(PROVIDER_ID),
                symbol: symbol.to_string(),
            })
        }
    };

    let field = |value: &Option<String>| value.as_deref().and_then(parse_decimal);

    let price = field(&quote.price).ok_or_else(|| missing_field(PROVIDER_ID, "05. price"))?;

    let timestamp = quote
        .latest_trading_day
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
        .unwrap_or_else(Utc::now);

    let quoted_symbol = quote.symbol.clone().unwrap_or_else(|| symbol.to_string());

    Ok(Quote::new(quoted_symbol, price, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_change(field(&quote.change), field(&quote.change_percent))
        .with_ohlc(
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.previous_close),
        )
        .with_volume(field(&quote.volume))
        .derive_change())
}
