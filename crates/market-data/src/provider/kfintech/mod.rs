//! KFintech mutual fund NAV provider.
//!
//! Registrar API for schemes serviced by KFintech. Authenticates with a bearer
//! token; a lookup for an unknown scheme returns an empty `Result` array.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::http::{self, missing_field, parse_decimal};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "KFINTECH";
pub const DEFAULT_BASE_URL: &str = "https://mfapi.kfintech.com/api";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NavResponse {
    #[serde(default)]
    result: Vec<SchemeNav>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SchemeNav {
    scheme_code: Option<String>,
    scheme_name: Option<String>,
    #[serde(rename = "NAV")]
    nav: Option<String>,
    /// "18/10/2024"
    #[serde(rename = "NAVDate")]
    nav_date: Option<String>,
}

/// KFintech NAV adapter. Requires a bearer token.
pub struct KfintechProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl KfintechProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
            token: config.require_api_key("bearer token")?,
        })
    }
}

#[async_trait]
impl QuoteProvider for KfintechProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::MutualFund]
    }

    async fn fetch_quote(&self, scheme_code: &str) -> Result<Quote, MarketDataError> {
        let scheme_code = scheme_code.trim();
        debug!("Fetching NAV for scheme {} from KFintech", scheme_code);

        let request = self
            .client
            .get(format!("{}/schemes/nav", self.base_url))
            .query(&[("schemeCode", scheme_code)])
            .bearer_auth(&self.token)
            .header("Accept", "application/json");

        let body = http::send(PROVIDER_ID, request).await?;
        parse_quote(scheme_code, &body)
    }
}

fn parse_quote(scheme_code: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: NavResponse = http::parse_json(PROVIDER_ID, body)?;

    let Some(entry) = response.result.into_iter().next() else {
        if let Some(message) = response.error_message.filter(|m| !m.trim().is_empty()) {
            debug!("KFintech returned no NAV for {}: {}", scheme_code, message);
        }
        return Err(MarketDataError::SymbolNotFound {
            provider: Cow::Borrowed(PROVIDER_ID),
            symbol: scheme_code.to_string(),
        });
    };

    let nav = entry
        .nav
        .as_deref()
        .and_then(parse_decimal)
        .ok_or_else(|| missing_field(PROVIDER_ID, "Result[0].NAV"))?;

    let timestamp = entry
        .nav_date
        .as_deref()
        .and_then(parse_nav_date)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
        .unwrap_or_else(Utc::now);

    let symbol = entry.scheme_code.unwrap_or_else(|| scheme_code.to_string());

    Ok(Quote::new(symbol, nav, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_name(entry.scheme_name.unwrap_or_default()))
}

/// KFintech has shipped both day-first and ISO dates.
fn parse_nav_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}
