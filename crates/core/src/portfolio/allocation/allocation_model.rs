//! Allocation models for portfolio breakdown by investment type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value held in one investment type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeAllocation {
    /// Investment type label (stock, mutual-fund, ...)
    pub investment_type: String,
    /// Number of investments of this type
    pub count: usize,
    /// Current value of the type
    pub value: Decimal,
    /// Amount invested in the type
    pub invested: Decimal,
    /// Percentage of total portfolio value (0-100)
    pub percentage: Decimal,
}
