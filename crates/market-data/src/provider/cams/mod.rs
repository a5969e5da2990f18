//! CAMS mutual fund NAV provider.
//!
//! Registrar API for schemes serviced by CAMS. Authenticates with an
//! `x-api-key` header and wraps every answer in a status envelope.

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

pub const PROVIDER_ID: &str = "CAMS";
pub const DEFAULT_BASE_URL: &str = "https://api.camsonline.com/v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavEnvelope {
    status: Option<String>,
    data: Option<NavData>,
    error_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavData {
    scheme_code: Option<String>,
    scheme_name: Option<String>,
    nav: Option<String>,
    /// "2024-10-18"
    nav_date: Option<String>,
    previous_nav: Option<String>,
}

/// CAMS NAV adapter. Requires an API key.
pub struct CamsProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CamsProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http::build_client(),
            base_url: config.endpoint().to_string(),
            api_key: config.require_api_key("x-api-key")?,
        })
    }
}

#[async_trait]
impl QuoteProvider for CamsProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        &[AssetClass::MutualFund]
    }

    async fn fetch_quote(&self, scheme_code: &str) -> Result<Quote, MarketDataError> {
        let scheme_code = scheme_code.trim();
        debug!("Fetching NAV for scheme {} from CAMS", scheme_code);

        let url = format!(
            "{}/nav/{}",
            self.base_url,
            urlencoding::encode(scheme_code)
        );
        let request = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json");

        let body = match http::send(PROVIDER_ID, request).await {
            Err(MarketDataError::ClientError { status: 404, .. }) => {
                return Err(not_found(scheme_code));
            }
            other => other?,
        };

        parse_quote(scheme_code, &body)
    }
}

fn not_found(scheme_code: &str) -> MarketDataError {
    MarketDataError::SymbolNotFound {
        provider: Cow::Borrowed(PROVIDER_ID),
        symbol: scheme_code.to_string(),
    }
}

fn parse_quote(scheme_code: &str, body: &str) -> Result<Quote, MarketDataError> {
    let envelope: NavEnvelope = http::parse_json(PROVIDER_ID, body)?;

    let failed = envelope
        .status
        .as_deref()
        .is_some_and(|s| !s.eq_ignore_ascii_case("success"));
    if failed {
        let message = envelope.message.unwrap_or_default();
        return Err(match envelope.error_code.as_deref() {
            Some("SCHEME_NOT_FOUND") | Some("INVALID_SCHEME") => not_found(scheme_code),
            Some("RATE_LIMIT_EXCEEDED") => MarketDataError::RateLimited {
                provider: Cow::Borrowed(PROVIDER_ID),
            },
            Some("INVALID_API_KEY") => MarketDataError::Unauthorized {
                provider: Cow::Borrowed(PROVIDER_ID),
                message,
            },
            code => MarketDataError::ClientError {
                provider: Cow::Borrowed(PROVIDER_ID),
                status: 200,
                message: format!("{}: {}", code.unwrap_or("ERROR"), message),
            },
        });
    }

    let data = envelope.data.ok_or_else(|| not_found(scheme_code))?;

    let nav = data
        .nav
        .as_deref()
        .and_then(parse_decimal)
        .ok_or_else(|| missing_field(PROVIDER_ID, "data.nav"))?;

    let timestamp = data
        .nav_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
        .unwrap_or_else(Utc::now);

    let symbol = data.scheme_code.unwrap_or_else(|| scheme_code.to_string());
    let previous_nav = data.previous_nav.as_deref().and_then(parse_decimal);

    Ok(Quote::new(symbol, nav, timestamp, Cow::Borrowed(PROVIDER_ID))
        .with_name(data.scheme_name.unwrap_or_default())
        .with_ohlc(None, None, None, previous_nav)
        .derive_change())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::RateLimit;
    use rust_decimal_macros::dec;

    #[test]
    fn test_requires_api_key() {
        let config = ProviderConfig::new(PROVIDER_ID, DEFAULT_BASE_URL, RateLimit::per_second(2.0));
        let err = CamsProvider::new(&config).err().unwrap();
        assert!(matches!(err, MarketDataError::MissingCredential { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_parse_nav() {
        let json = r#"{
            "status": "success",
            "data": {
                "schemeCode": "119551",
                "schemeName": "Aditya Birla Sun Life Banking & PSU Debt Fund - Direct - IDCW",
                "nav": "105.4312",
                "navDate": "2024-10-18",
                "previousNav": "105.3900"
            }
        }"#;
        let quote = parse_quote("119551", json).unwrap();
        assert_eq!(quote.symbol, "119551");
        assert_eq!(quote.price, dec!(105.4312));
        assert_eq!(quote.previous_close, Some(dec!(105.39)));
        assert_eq!(quote.change, Some(dec!(0.0412)));
        assert_eq!(quote.provider, "CAMS");
        assert_eq!(quote.timestamp.format("%Y-%m-%d").to_string(), "2024-10-18");
    }

    #[test]
    fn test_scheme_not_found() {
        let json = r#"{"status": "error", "errorCode": "SCHEME_NOT_FOUND", "message": "No such scheme"}"#;
        let err = parse_quote("000000", json).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_envelope_rate_limit_is_transient() {
        let json = r#"{"status": "error", "errorCode": "RATE_LIMIT_EXCEEDED", "message": "slow down"}"#;
        let err = parse_quote("119551", json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_missing_nav_is_malformed() {
        let json = r#"{"status": "success", "data": {"schemeCode": "119551", "nav": ""}}"#;
        let err = parse_quote("119551", json).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }
}
