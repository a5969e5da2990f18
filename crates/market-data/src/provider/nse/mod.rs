//! National Stock Exchange of India quote provider.
//!
//! Fetches equity quotes from the exchange's public `quote-equity` endpoint.
//! The endpoint expects browser-like headers and returns an empty object or a
//! 404 for symbols it does not list.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::http::{self, decimal_from_f64, missing_field};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "NSE";
pub const DEFAULT_BASE_URL: &str = "https://www.nseindia.com/api";

/// India Standard Time, the zone NSE stamps its quotes in.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEquityResponse {
    info: Option<Info>,
    metadata: Option<Metadata>,
    price_info: Option<PriceInfo>,
    pre_open_market: Option<PreOpenMarket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Info {
    symbol: Option<String>,
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    /// e.g. "18-Oct-2024 16:00:00"
    last_update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceInfo {
    last_price: Option<f64>,
    change: Option<f64>,
    p_change: Option<f64>,
    previous_close: Option<f64>,
    open: Option<f64>,
    intra_day_high_low: Option<HighLow>,
}

#[derive(Debug, Deserialize)]
struct HighLow {
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreOpenMarket {
    total_traded_volume: Option<f64>,
}

// ============================================================================
// NseProvider
// ============================================================================

/// NSE equity quote adapter. Needs no credential.
pub struct NseProvider {
    client: Client,
    base_url: String,
}

impl NseProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for NseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::Equity]
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        debug!("Fetching latest quote for {} from NSE", symbol);

        let request = self
            .client
            .get(format!("{}/quote-equity", self.base_url))
            .query(&[("symbol", symbol.as_str())])
            .header("Accept", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Referer", "https://www.nseindia.com/");

        let body = match http::send(PROVIDER_ID, request).await {
            Err(MarketDataError::ClientError { status: 404, .. }) => {
                return Err(not_found(&symbol));
            }
            other => other?,
        };

        parse_quote(&symbol, &body)
    }
}

fn not_found(symbol: &str) -> MarketDataError {
    MarketDataError::SymbolNotFound {
        provider: Cow::Borrowed(PROVIDER_ID),
        symbol: symbol.to_string(),
    }
}

/// Map a `quote-equity` body into a canonical quote.
fn parse_quote(symbol: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: QuoteEquityResponse = http::parse_json(PROVIDER_ID, body)?;

    let Some(price_info) = response.price_info else {
        // NSE answers unknown symbols with `{}`.
        return Err(not_found(symbol));
    };

    let price = price_info
        .last_price
        .and_then(decimal_from_f64)
        .ok_or_else(|| missing_field(PROVIDER_ID, "priceInfo.lastPrice"))?;

    let timestamp = response
        .metadata
        .and_then(|m| m.last_update_time)
        .and_then(|t| parse_timestamp(&t))
        .unwrap_or_else(Utc::now);

    let (name, quoted_symbol) = match response.info {
        Some(info) => (
            info.company_name.unwrap_or_default(),
            info.symbol.unwrap_or_else(|| symbol.to_string()),
        ),
        None => (String::new(), symbol.to_string()),
    };

    let (low, high) = match price_info.intra_day_high_low {
        Some(hl) => (
            hl.min.and_then(decimal_from_f64),
            hl.max.and_then(decimal_from_f64),
        ),
        None => (None, None),
    };

    let volume = response
        .pre_open_market
        .and_then(|p| p.total_traded_volume)
        .and_then(decimal_from_f64);

    Ok(Quote::new(quoted_symbol, price, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_name(name)
        .with_change(
            price_info.change.and_then(decimal_from_f64),
            price_info.p_change.and_then(decimal_from_f64),
        )
        .with_ohlc(
            price_info.open.and_then(decimal_from_f64),
            high,
            low,
            price_info.previous_close.and_then(decimal_from_f64),
        )
        .with_volume(volume)
        .derive_change())
}

/// Parse "18-Oct-2024 16:00:00" in IST.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%d-%b-%Y %H:%M:%S").ok()?;
    let ist = FixedOffset::east_opt(IST_OFFSET_SECS)?;
    ist.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
