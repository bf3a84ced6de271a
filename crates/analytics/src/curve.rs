//! Equity and drawdown curves, and the daily-return series derived from them.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Day-end account value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
}

/// Distance below the running high-water mark at day end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown: Decimal,
    /// In percent of the high-water mark.
    pub drawdown_pct: Decimal,
}

/// Prepends the account value before the first trading day, dated the day before it.
///
/// Drawdown and return statistics measure the first day against the opening balance
/// rather than against its own close.
pub fn with_opening_equity(equity_curve: &[EquityPoint], opening_equity: Decimal) -> Vec<EquityPoint> {
    let Some(first) = equity_curve.first() else {
        return Vec::new();
    };
    let opening = EquityPoint {
        date: first.date.pred_opt().unwrap_or(first.date),
        equity: opening_equity,
    };
    std::iter::once(opening).chain(equity_curve.iter().copied()).collect()
}

pub fn drawdown_curve(equity_curve: &[EquityPoint]) -> Vec<DrawdownPoint> {
    let mut peak = Decimal::ZERO;
    equity_curve
        .iter()
        .map(|point| {
            peak = peak.max(point.equity);
            let drawdown = peak - point.equity;
            let drawdown_pct = if peak.is_zero() {
                Decimal::ZERO
            } else {
                drawdown / peak * Decimal::ONE_HUNDRED
            };
            DrawdownPoint {
                date: point.date,
                drawdown,
                drawdown_pct,
            }
        })
        .collect()
}

/// Simple day-over-day returns as fractions. Days following a zero equity are skipped.
pub fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| !w[0].equity.is_zero())
        .filter_map(|w| ((w[1].equity - w[0].equity) / w[0].equity).to_f64())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::curve;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = drawdown_curve(&curve(&[100, 120, 90, 130]));
        let values: Vec<_> = dd.iter().map(|p| p.drawdown).collect();
        assert_eq!(values, vec![dec!(0), dec!(0), dec!(30), dec!(0)]);
        assert_eq!(dd[2].drawdown_pct, dec!(25));
    }

    #[test]
    fn opening_equity_sets_the_first_peak() {
        let seeded = with_opening_equity(&curve(&[95000, 93000, 89000]), dec!(100000));
        assert_eq!(seeded.len(), 4);
        assert_eq!(seeded[0].date, seeded[1].date.pred_opt().unwrap());

        let dd = drawdown_curve(&seeded);
        assert_eq!(dd.last().unwrap().drawdown, dec!(11000));
        assert_eq!(dd.last().unwrap().drawdown_pct, dec!(11));
        assert_relative_eq!(daily_returns(&seeded)[0], -0.05);
        assert!(with_opening_equity(&[], dec!(100)).is_empty());
    }

    #[test]
    fn returns_are_fractions() {
        let returns = daily_returns(&curve(&[100, 110, 99]));
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1);
        assert_relative_eq!(returns[1], -0.1);
    }
}
