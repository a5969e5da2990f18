use rust_decimal::Decimal;

use crate::errors::{Error, Result};
use crate::investments::Investment;

use super::PortfolioTotals;

/// Sum a snapshot of investments into portfolio totals.
///
/// Pure: the same input always produces the same totals. A position that was
/// never priced contributes its invested amount to `total_value`. Sums that
/// leave the `Decimal` range fail with [`Error::ValuationOverflow`].
pub fn valuate(investments: &[Investment]) -> Result<PortfolioTotals> {
    let (total_value, total_invested) = investments.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(value, invested), inv| {
            Ok::<_, Error>((
                value
                    .checked_add(inv.market_value())
                    .ok_or(Error::ValuationOverflow("total value"))?,
                invested
                    .checked_add(inv.invested_amount)
                    .ok_or(Error::ValuationOverflow("total invested"))?,
            ))
        },
    )?;

    let total_gain_loss = total_value
        .checked_sub(total_invested)
        .ok_or(Error::ValuationOverflow("total gain/loss"))?;
    let total_gain_loss_percent = if total_invested.is_zero() {
        Decimal::ZERO
    } else {
        total_gain_loss
            .checked_div(total_invested)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(Error::ValuationOverflow("total gain/loss percent"))?
    };

    Ok(PortfolioTotals {
        total_value,
        total_invested,
        total_gain_loss,
        total_gain_loss_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investments::InvestmentType;
    use rust_decimal_macros::dec;

    fn priced(id: &str, invested: Decimal, value: Decimal) -> Investment {
        let mut inv = Investment::new(id, InvestmentType::Stock, invested);
        inv.current_value = Some(value);
        inv
    }

    #[test]
    fn test_single_position() {
        let mut inv = Investment::new("1", InvestmentType::Stock, dec!(900))
            .with_symbol("TCS")
            .with_quantity(dec!(10));
        inv.current_price = Some(dec!(100));
        inv.current_value = Some(dec!(1000));

        let totals = valuate(&[inv]).unwrap();
        assert_eq!(totals.total_value, dec!(1000));
        assert_eq!(totals.total_invested, dec!(900));
        assert_eq!(totals.total_gain_loss, dec!(100));
        assert_eq!(totals.total_gain_loss_percent.round_dp(2), dec!(11.11));
    }

    #[test]
    fn test_zero_invested_gives_zero_percent() {
        let totals = valuate(&[priced("bonus", dec!(0), dec!(250))]).unwrap();
        assert_eq!(totals.total_gain_loss, dec!(250));
        assert_eq!(totals.total_gain_loss_percent, dec!(0));
    }

    #[test]
    fn test_empty_portfolio() {
        assert_eq!(valuate(&[]).unwrap(), PortfolioTotals::default());
    }

    #[test]
    fn test_unpriced_positions_count_at_cost() {
        let fd = Investment::new("fd", InvestmentType::FixedDeposit, dec!(1000));
        let totals = valuate(&[fd, priced("s", dec!(500), dec!(400))]).unwrap();
        assert_eq!(totals.total_value, dec!(1400));
        assert_eq!(totals.total_invested, dec!(1500));
        assert_eq!(totals.total_gain_loss, dec!(-100));
        assert_eq!(totals.total_gain_loss_percent.round_dp(4), dec!(-6.6667));
    }

    #[test]
    fn test_overflowing_totals_are_an_error() {
        let err = valuate(&[
            priced("a", dec!(1), Decimal::MAX),
            priced("b", dec!(1), Decimal::MAX),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::ValuationOverflow("total value")));

        let err = valuate(&[priced("tiny", dec!(0.0000000001), Decimal::MAX)]).unwrap_err();
        assert!(matches!(err, Error::ValuationOverflow(_)));
    }
}
