//! Portfolio valuation domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate value of a set of investments. A computed view, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_gain_loss: Decimal,
    /// Percent of `total_invested`; 0 when nothing was invested.
    pub total_gain_loss_percent: Decimal,
}
