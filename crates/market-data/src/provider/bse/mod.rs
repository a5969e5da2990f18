//! BSE (Bombay Stock Exchange) quote provider.
//!
//! Uses the `getScripHeaderData` endpoint keyed by the numeric scrip code
//! (e.g. `500325` for Reliance). Every number in the payload is a string, and
//! an unknown scrip comes back with a null `Header`.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::http::{self, missing_field, parse_decimal};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "BSE";
pub const DEFAULT_BASE_URL: &str = "https://api.bseindia.com/BseIndiaAPI/api";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScripHeaderResponse {
    header: Option<Header>,
    curr_rate: Option<CurrRate>,
    cmpname: Option<CompanyName>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "PrevClose")]
    prev_close: Option<String>,
    #[serde(rename = "Open")]
    open: Option<String>,
    #[serde(rename = "High")]
    high: Option<String>,
    #[serde(rename = "Low")]
    low: Option<String>,
    #[serde(rename = "LTP")]
    ltp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrRate {
    #[serde(rename = "LTP")]
    ltp: Option<String>,
    #[serde(rename = "Chg")]
    chg: Option<String>,
    #[serde(rename = "PcChg")]
    pc_chg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanyName {
    #[serde(rename = "FullN")]
    full_name: Option<String>,
}

/// BSE equity quote adapter. Needs no credential.
pub struct BseProvider {
    client: Client,
    base_url: String,
}

impl BseProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for BseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::Equity]
    }

    async fn fetch_quote(&self, scrip_code: &str) -> Result<Quote, MarketDataError> {
        let scrip_code = scrip_code.trim();
        debug!("Fetching latest quote for scrip {} from BSE", scrip_code);

        let request = self
            .client
            .get(format!("{}/getScripHeaderData/w", self.base_url))
            .query(&[("Debtflag", ""), ("scripcode", scrip_code), ("seriesid", "")])
            .header("Accept", "application/json")
            .header("Origin", "https://www.bseindia.com")
            .header("Referer", "https://www.bseindia.com/");

        let body = http::send(PROVIDER_ID, request).await?;
        parse_quote(scrip_code, &body)
    }
}

fn parse_quote(scrip_code: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: ScripHeaderResponse = http::parse_json(PROVIDER_ID, body)?;

    let Some(header) = response.header else {
        return Err(MarketDataError::SymbolNotFound {
            provider: Cow::Borrowed(PROVIDER_ID),
            symbol: scrip_code.to_string(),
        });
    };

    let field = |value: &Option<String>| value.as_deref().and_then(parse_decimal);

    // CurrRate carries the live price; Header.LTP lags it slightly.
    let price = response
        .curr_rate
        .as_ref()
        .and_then(|r| field(&r.ltp))
        .or_else(|| field(&header.ltp))
        .ok_or_else(|| missing_field(PROVIDER_ID, "CurrRate.LTP"))?;

    let (change, change_percent) = match &response.curr_rate {
        Some(rate) => (field(&rate.chg), field(&rate.pc_chg)),
        None => (None, None),
    };

    let name = response
        .cmpname
        .and_then(|c| c.full_name)
        .unwrap_or_default();

    Ok(Quote::new(scrip_code, price, Utc::now(), Cow::Borrowed(PROVIDER_ID))
        .with_name(name)
        .with_change(change, change_percent)
        .with_ohlc(
            field(&header.open),
            field(&header.high),
            field(&header.low),
            field(&header.prev_close),
        )
        .derive_change())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_quote() {
        let json = r#"{
            "Header": {"PrevClose": "2,728.20", "Open": "2,730.00", "High": "2,750.00",
                       "Low": "2,720.10", "LTP": "2,739.00"},
            "CurrRate": {"LTP": "2,740.50", "Chg": "12.30", "PcChg": "0.45"},
            "Cmpname": {"FullN": "Reliance Industries Ltd"}
        }"#;
        let quote = parse_quote("500325", json).unwrap();
        assert_eq!(quote.symbol, "500325");
        assert_eq!(quote.name, "Reliance Industries Ltd");
        assert_eq!(quote.price, dec!(2740.50));
        assert_eq!(quote.change, Some(dec!(12.30)));
        assert_eq!(quote.change_percent, Some(dec!(0.45)));
        assert_eq!(quote.previous_close, Some(dec!(2728.20)));
        assert_eq!(quote.high, Some(dec!(2750.00)));
        assert_eq!(quote.provider, "BSE");
    }

    #[test]
    fn test_derives_change_when_curr_rate_missing() {
        let json = r#"{"Header": {"PrevClose": "100.00", "LTP": "105.00"}}"#;
        let quote = parse_quote("532540", json).unwrap();
        assert_eq!(quote.price, dec!(105.00));
        assert_eq!(quote.change, Some(dec!(5.00)));
        assert_eq!(quote.change_percent, Some(dec!(5)));
        assert_eq!(quote.name, "532540");
    }

    #[test]
    fn test_null_header_is_symbol_not_found() {
        let err = parse_quote("999999", r#"{"Header": null, "CurrRate": null}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_unparseable_price_is_malformed() {
        let json = r#"{"Header": {"LTP": "-"}, "CurrRate": {"LTP": ""}}"#;
        let err = parse_quote("500325", json).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }
}
