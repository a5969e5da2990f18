use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::errors::{Error, Result};
use crate::investments::Investment;

use super::TypeAllocation;

/// Break a snapshot down by investment type, largest value first.
///
/// Percentages are rounded to two decimals and are all 0 when the portfolio
/// has no value.
pub fn allocation_by_type(investments: &[Investment]) -> Result<Vec<TypeAllocation>> {
    let overflow = || Error::ValuationOverflow("allocation");

    let mut by_type: HashMap<String, TypeAllocation> = HashMap::new();
    for inv in investments {
        let entry = by_type
            .entry(inv.investment_type.to_string())
            .or_insert_with(|| TypeAllocation {
                investment_type: inv.investment_type.to_string(),
                count: 0,
                value: Decimal::ZERO,
                invested: Decimal::ZERO,
                percentage: Decimal::ZERO,
            });
        entry.count += 1;
        entry.value = entry.value.checked_add(inv.market_value()).ok_or_else(overflow)?;
        entry.invested = entry
            .invested
            .checked_add(inv.invested_amount)
            .ok_or_else(overflow)?;
    }

    let total_value = by_type
        .values()
        .try_fold(Decimal::ZERO, |total, a| total.checked_add(a.value))
        .ok_or_else(overflow)?;

    let mut allocations = by_type
        .into_values()
        .map(|mut allocation| -> Result<TypeAllocation> {
            if total_value > Decimal::ZERO {
                allocation.percentage = allocation
                    .value
                    .checked_div(total_value)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .ok_or_else(overflow)?
                    .round_dp(2);
            }
            Ok(allocation)
        })
        .collect::<Result<Vec<_>>>()?;

    allocations.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.investment_type.cmp(&b.investment_type))
    });
    Ok(allocations)
}
