use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use finsight_market_data::{AssetClass, MarketDataError, Quote};

use super::InvestmentType;

/// A position as handed over by the persistence layer.
///
/// The sync layer reads `type`, the identifiers and `quantity`, and only ever
/// rewrites `current_price` / `current_value`. Every other field the caller
/// sent is kept in `extra` and written back untouched.
///
/// The wire format is snake_case. The camelCase spellings of the known fields
/// are accepted on input only; output always uses the snake_case keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,

    #[serde(rename = "type")]
    pub investment_type: InvestmentType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(default, alias = "schemeCode", skip_serializing_if = "Option::is_none")]
    pub scheme_code: Option<String>,

    /// Units held; absent for positions valued as a whole (fixed deposits).
    #[serde(default)]
    pub quantity: Option<Decimal>,

    #[serde(alias = "investedAmount")]
    pub invested_amount: Decimal,

    #[serde(default, alias = "currentPrice")]
    pub current_price: Option<Decimal>,

    #[serde(default, alias = "currentValue")]
    pub current_value: Option<Decimal>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Investment {
    pub fn new(
        id: impl Into<String>,
        investment_type: InvestmentType,
        invested_amount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            investment_type,
            symbol: None,
            scheme_code: None,
            quantity: None,
            invested_amount,
            current_price: None,
            current_value: None,
            extra: Map::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_scheme_code(mut self, scheme_code: impl Into<String>) -> Self {
        self.scheme_code = Some(scheme_code.into());
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn asset_class(&self) -> Option<AssetClass> {
        self.investment_type.asset_class()
    }

    /// Identifier to send to the provider.
    ///
    /// Funds are looked up by scheme code first; everything else by symbol
    /// first. Blank values count as missing.
    pub fn lookup_identifier(&self) -> Option<&str> {
        fn non_blank(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        match self.investment_type {
            InvestmentType::MutualFund => {
                non_blank(&self.scheme_code).or_else(|| non_blank(&self.symbol))
            }
            _ => non_blank(&self.symbol).or_else(|| non_blank(&self.scheme_code)),
        }
    }

    /// Reprice the position from a quote.
    ///
    /// With a quantity the value is `quantity * price`; without one the
    /// provider price is taken as the position's absolute worth. A value that
    /// does not fit in a `Decimal` is rejected as a malformed quote and the
    /// record is left as it was.
    pub fn apply_quote(&mut self, quote: &Quote) -> Result<(), MarketDataError> {
        let value = match self.quantity {
            Some(quantity) => {
                quantity
                    .checked_mul(quote.price)
                    .ok_or_else(|| MarketDataError::MalformedResponse {
                        provider: quote.provider.clone(),
                        message: format!(
                            "price {} for {} overflows position value at quantity {}",
                            quote.price, quote.symbol, quantity
                        ),
                    })?
            }
            None => quote.price,
        };
        self.current_price = Some(quote.price);
        self.current_value = Some(value);
        Ok(())
    }

    /// Value used for totals: the last computed value, or the invested
    /// amount for a position that was never priced.
    pub fn market_value(&self) -> Decimal {
        self.current_value.unwrap_or(self.invested_amount)
    }

    /// `None` when the difference does not fit in a `Decimal`.
    pub fn gain_loss(&self) -> Option<Decimal> {
        self.market_value().checked_sub(self.invested_amount)
    }

    /// Gain or loss as a percentage of the invested amount, 0 when nothing
    /// was invested.
    pub fn gain_loss_percent(&self) -> Option<Decimal> {
        if self.invested_amount.is_zero() {
            return Some(Decimal::ZERO);
        }
        self.gain_loss()?
            .checked_div(self.invested_amount)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    fn quote(price: Decimal) -> Quote {
        Quote::new("X", price, Utc::now(), Cow::Borrowed("NSE"))
    }

    #[test]
    fn test_apply_quote_with_quantity() {
        let mut inv = Investment::new("1", InvestmentType::Stock, dec!(900))
            .with_symbol("TCS")
            .with_quantity(dec!(10));
        inv.apply_quote(&quote(dec!(100))).unwrap();

        assert_eq!(inv.current_price, Some(dec!(100)));
        assert_eq!(inv.current_value, Some(dec!(1000)));
        assert_eq!(inv.gain_loss(), Some(dec!(100)));
        assert_eq!(inv.gain_loss_percent().unwrap().round_dp(2), dec!(11.11));
    }

    #[test]
    fn test_apply_quote_without_quantity() {
        let mut inv = Investment::new("2", InvestmentType::Crypto, dec!(5000)).with_symbol("bitcoin");
        inv.apply_quote(&quote(dec!(5500))).unwrap();
        assert_eq!(inv.current_value, Some(dec!(5500)));
    }

    #[test]
    fn test_overflowing_value_is_rejected_and_record_kept() {
        let mut inv = Investment::new("7", InvestmentType::Stock, dec!(900))
            .with_symbol("TCS")
            .with_quantity(dec!(10000));
        let before = inv.clone();

        let err = inv.apply_quote(&quote(Decimal::MAX)).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
        assert_eq!(err.kind(), finsight_market_data::ErrorKind::Permanent);
        assert_eq!(inv, before);
    }

    #[test]
    fn test_gain_loss_overflow_is_none() {
        let mut inv = Investment::new("8", InvestmentType::Stock, Decimal::MIN);
        inv.current_value = Some(Decimal::MAX);
        assert_eq!(inv.gain_loss(), None);
        assert_eq!(inv.gain_loss_percent(), None);

        let mut inv = Investment::new("9", InvestmentType::Stock, dec!(0.0000000001));
        inv.current_value = Some(Decimal::MAX);
        assert_eq!(inv.gain_loss_percent(), None);
    }

    #[test]
    fn test_lookup_identifier() {
        let fund = Investment::new("3", InvestmentType::MutualFund, dec!(1))
            .with_symbol("AXISELSS")
            .with_scheme_code("120503");
        assert_eq!(fund.lookup_identifier(), Some("120503"));

        let stock = Investment::new("4", InvestmentType::Stock, dec!(1)).with_symbol("  ");
        assert_eq!(stock.lookup_identifier(), None);

        let stock = stock.with_scheme_code("500325");
        assert_eq!(stock.lookup_identifier(), Some("500325"));
    }

    #[test]
    fn test_unpriced_position_counts_invested_amount() {
        let fd = Investment::new("5", InvestmentType::FixedDeposit, dec!(25000));
        assert_eq!(fd.market_value(), dec!(25000));
        assert_eq!(fd.gain_loss(), Some(dec!(0)));
        assert_eq!(
            Investment::new("6", InvestmentType::Gold, dec!(0)).gain_loss_percent(),
            Some(dec!(0))
        );
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{
            "id": "inv-1",
            "type": "mutual-fund",
            "schemeCode": "119551",
            "quantity": 12.5,
            "invested_amount": 600,
            "current_price": null,
            "current_value": null,
            "user_id": "u-42",
            "notes": "SIP"
        }"#;
        let inv: Investment = serde_json::from_str(json).unwrap();
        assert_eq!(inv.scheme_code.as_deref(), Some("119551"));
        assert_eq!(inv.quantity, Some(dec!(12.5)));
        assert_eq!(inv.extra.get("user_id"), Some(&Value::from("u-42")));

        let back = serde_json::to_value(&inv).unwrap();
        assert_eq!(back["notes"], "SIP");
        assert_eq!(back["type"], "mutual-fund");
        assert_eq!(back["scheme_code"], "119551");
    }

    #[test]
    fn test_camel_case_input_is_written_back_in_snake_case() {
        let json = r#"{
            "id": "inv-2",
            "type": "stock",
            "symbol": "TCS",
            "schemeCode": "S1",
            "investedAmount": 900,
            "currentPrice": 95,
            "currentValue": 950
        }"#;
        let inv: Investment = serde_json::from_str(json).unwrap();
        assert!(inv.extra.is_empty());

        let back = serde_json::to_value(&inv).unwrap();
        let keys: Vec<&str> = back.as_object().unwrap().keys().map(String::as_str).collect();
        for camel in ["schemeCode", "investedAmount", "currentPrice", "currentValue"] {
            assert!(!keys.contains(&camel), "{}", camel);
        }
        assert_eq!(back["scheme_code"], "S1");
        assert_eq!(back["invested_amount"], 900.0);
        assert_eq!(back["current_value"], 950.0);
    }
}
