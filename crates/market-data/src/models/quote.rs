use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::ProviderId;

/// Canonical market data quote.
///
/// Every adapter maps its provider's response into this one shape. A quote is
/// produced by exactly one adapter call and is dropped once the investment it
/// priced has been updated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol or scheme code the quote was requested for
    pub symbol: String,

    /// Display name (company or scheme name), falls back to the symbol
    pub name: String,

    /// Last traded price, or NAV for mutual funds
    pub price: Decimal,

    /// Absolute change against the previous close
    pub change: Option<Decimal>,

    /// Percent change against the previous close
    pub change_percent: Option<Decimal>,

    /// Traded volume for the session
    pub volume: Option<Decimal>,

    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub open: Option<Decimal>,
    pub previous_close: Option<Decimal>,

    /// Time the provider stamped the price with
    pub timestamp: DateTime<Utc>,

    /// Provider that produced this quote (NSE, CAMS, ...)
    pub provider: ProviderId,
}

impl Quote {
    /// Create a new quote with minimal required fields
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        timestamp: DateTime<Utc>,
        provider: ProviderId,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            price,
            change: None,
            change_percent: None,
            volume: None,
            high: None,
            low: None,
            open: None,
            previous_close: None,
            timestamp,
            provider,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.name = name;
        }
        self
    }

    pub fn with_change(mut self, change: Option<Decimal>, change_percent: Option<Decimal>) -> Self {
        self.change = change;
        self.change_percent = change_percent;
        self
    }

    pub fn with_ohlc(
        mut self,
        open: Option<Decimal>,
        high: Option<Decimal>,
        low: Option<Decimal>,
        previous_close: Option<Decimal>,
    ) -> Self {
        self.open = open;
        self.high = high;
        self.low = low;
        self.previous_close = previous_close;
        self
    }

    pub fn with_volume(mut self, volume: Option<Decimal>) -> Self {
        self.volume = volume;
        self
    }

    /// Fill `change` / `change_percent` from `previous_close` when the
    /// provider did not publish them. Values out of `Decimal` range stay `None`.
    pub fn derive_change(mut self) -> Self {
        let Some(previous) = self.previous_close else {
            return self;
        };
        let change = self.price.checked_sub(previous);
        if self.change.is_none() {
            self.change = change;
        }
        if self.change_percent.is_none() && !previous.is_zero() {
            self.change_percent = change
                .and_then(|c| c.checked_div(previous))
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|pct| pct.round_dp(4));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("RELIANCE", dec!(2740.50), Utc::now(), Cow::Borrowed("NSE"));
        assert_eq!(quote.price, dec!(2740.50));
        assert_eq!(quote.name, "RELIANCE");
        assert!(quote.open.is_none());
        assert!(quote.change.is_none());
    }

    #[test]
    fn test_blank_name_keeps_symbol() {
        let quote = Quote::new("119551", dec!(50), Utc::now(), Cow::Borrowed("MFAPI")).with_name("  ");
        assert_eq!(quote.name, "119551");
    }

    #[test]
    fn test_derive_change_from_previous_close() {
        let quote = Quote::new("TCS", dec!(110), Utc::now(), Cow::Borrowed("BSE"))
            .with_ohlc(None, None, None, Some(dec!(100)))
            .derive_change();
        assert_eq!(quote.change, Some(dec!(10)));
        assert_eq!(quote.change_percent, Some(dec!(10)));
    }

    #[test]
    fn test_derive_change_keeps_provider_values() {
        let quote = Quote::new("TCS", dec!(110), Utc::now(), Cow::Borrowed("NSE"))
            .with_change(Some(dec!(9.5)), Some(dec!(9.45)))
            .with_ohlc(None, None, None, Some(dec!(100)))
            .derive_change();
        assert_eq!(quote.change, Some(dec!(9.5)));
        assert_eq!(quote.change_percent, Some(dec!(9.45)));
    }

    #[test]
    fn test_serializes_canonical_shape() {
        let quote = Quote::new("INFY", dec!(1500), Utc::now(), Cow::Borrowed("NSE"));
        let json = serde_json::to_value(&quote).unwrap();
        for key in [
            "symbol",
            "name",
            "price",
            "change",
            "changePercent",
            "volume",
            "high",
            "low",
            "open",
            "previousClose",
            "timestamp",
            "provider",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["provider"], "NSE");
    }

    #[test]
    fn test_derive_change_out_of_range_stays_empty() {
        let quote = Quote::new("X", Decimal::MAX, Utc::now(), Cow::Borrowed("NSE"))
            .with_ohlc(None, None, None, Some(Decimal::MIN))
            .derive_change();
        assert!(quote.change.is_none());
        assert!(quote.change_percent.is_none());

        let quote = Quote::new("X", Decimal::MAX, Utc::now(), Cow::Borrowed("NSE"))
            .with_ohlc(None, None, None, Some(dec!(0.0000000001)))
            .derive_change();
        assert!(quote.change_percent.is_none());
    }
}
