//! MFAPI.in mutual fund NAV provider.
//!
//! Free public mirror of AMFI NAV data, keyed by AMFI scheme code. No
//! credential needed.

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

pub const PROVIDER_ID: &str = "MFAPI";
pub const DEFAULT_BASE_URL: &str = "https://api.mfapi.in";

#[derive(Debug, Deserialize)]
struct LatestNavResponse {
    meta: Option<SchemeMeta>,
    #[serde(default)]
    data: Vec<NavPoint>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SchemeMeta {
    scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NavPoint {
    /// "18-10-2024"
    date: String,
    nav: String,
}

pub struct MfapiProvider {
    client: Client,
    base_url: String,
}

impl MfapiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for MfapiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::MutualFund]
    }

    async fn fetch_quote(&self, scheme_code: &str) -> Result<Quote, MarketDataError> {
        let scheme_code = scheme_code.trim();
        debug!("Fetching latest NAV for scheme {} from MFAPI", scheme_code);

        let url = format!(
            "{}/mf/{}/latest",
            self.base_url,
            urlencoding::encode(scheme_code)
        );
        let body = http::send(PROVIDER_ID, self.client.get(url)).await?;
        parse_quote(scheme_code, &body)
    }
}

fn parse_quote(scheme_code: &str, body: &str) -> Result<Quote, MarketDataError> {
    let response: LatestNavResponse = http::parse_json(PROVIDER_ID, body)?;

    let not_found = || MarketDataError::SymbolNotFound {
        provider: Cow::Borrowed(PROVIDER_ID),
        symbol: scheme_code.to_string(),
    };

    if response
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
    {
        return Err(not_found());
    }

    // Newest point first.
    let Some(point) = response.data.first() else {
        return Err(not_found());
    };

    let nav = parse_decimal(&point.nav).ok_or_else(|| missing_field(PROVIDER_ID, "data[0].nav"))?;

    let timestamp = NaiveDate::parse_from_str(point.date.trim(), "%d-%m-%Y")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
        .unwrap_or_else(Utc::now);

    let previous_nav = response.data.get(1).and_then(|p| parse_decimal(&p.nav));
    let name = response
        .meta
        .and_then(|m| m.scheme_name)
        .unwrap_or_default();

    Ok(Quote::new(scheme_code, nav, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_name(name)
        .with_ohlc(None, None, None, previous_nav)
        .derive_change())
}
