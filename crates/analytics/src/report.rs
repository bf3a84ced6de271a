use crate::curve::{daily_returns, drawdown_curve, with_opening_equity, EquityPoint};
use crate::error::AnalyticsError;
use crate::TRADING_DAYS_PER_YEAR;
use core_types::Trade;
use indicators::stats::{mean, std_dev};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// The summary statistics of a completed backtest.
///
/// Money is `Decimal`; ratios built on return statistics are `f64`. Percentages are
/// in percent (5.0 means 5%). Ratios that are undefined for the data (no losing
/// trade, zero volatility, no drawdown) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub initial_capital: Decimal,
    pub final_equity: Decimal,
    pub total_return: Decimal,
    pub total_return_pct: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>,

    // II. Risk and Drawdown
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
    /// Mean daily return over its standard deviation, annualised by sqrt(252).
    pub sharpe_ratio: Option<f64>,
    /// Total return over max drawdown, both in percent.
    pub calmar_ratio: Option<f64>,

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Option<Decimal>,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub average_trade_pnl: Decimal,

    // IV. Costs and Time
    pub total_commission: Decimal,
    pub total_slippage: Decimal,
    pub average_holding_days: f64,
}

impl PerformanceReport {
    /// A zeroed report for a run that starts and ends with `initial_capital`.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            final_equity: initial_capital,
            total_return: Decimal::ZERO,
            total_return_pct: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: None,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            sharpe_ratio: None,
            calmar_ratio: None,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: None,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            average_trade_pnl: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            total_slippage: Decimal::ZERO,
            average_holding_days: 0.0,
        }
    }

    /// Derives every summary metric from a trade log and a day-end equity curve.
    pub fn calculate(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: Decimal,
    ) -> Result<Self, AnalyticsError> {
        if initial_capital <= Decimal::ZERO {
            return Err(AnalyticsError::Calculation(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }
        let mut report = Self::new(initial_capital);
        report.calculate_returns(equity_curve);
        report.calculate_trade_statistics(trades);
        let seeded = with_opening_equity(equity_curve, initial_capital);
        report.calculate_drawdown(&seeded);
        report.calculate_ratios(&seeded);
        Ok(report)
    }

    fn calculate_returns(&mut self, equity_curve: &[EquityPoint]) {
        if let Some(last) = equity_curve.last() {
            self.final_equity = last.equity;
        }
        self.total_return = self.final_equity - self.initial_capital;
        self.total_return_pct = self.total_return / self.initial_capital * Decimal::ONE_HUNDRED;
    }

    fn calculate_trade_statistics(&mut self, trades: &[Trade]) {
        self.total_trades = trades.len();
        if trades.is_empty() {
            return;
        }

        let mut net = Decimal::ZERO;
        let mut holding_days = 0i64;
        for trade in trades {
            net += trade.pnl;
            holding_days += trade.holding_period_days;
            self.total_commission += trade.commission;
            self.total_slippage += trade.slippage;
            if trade.is_win() {
                self.gross_profit += trade.pnl;
                self.winning_trades += 1;
            } else {
                self.gross_loss += trade.pnl.abs();
                self.losing_trades += 1;
            }
        }

        let count = Decimal::from(self.total_trades);
        self.average_trade_pnl = net / count;
        self.average_holding_days = holding_days as f64 / self.total_trades as f64;
        self.win_rate_pct = Some(Decimal::from(self.winning_trades) / count * Decimal::ONE_HUNDRED);

        if self.winning_trades > 0 {
            self.average_win = self.gross_profit / Decimal::from(self.winning_trades);
        }
        if self.losing_trades > 0 {
            self.average_loss = self.gross_loss / Decimal::from(self.losing_trades);
        }
        if self.gross_loss > Decimal::ZERO {
            self.profit_factor = Some(self.gross_profit / self.gross_loss);
        }
    }

    fn calculate_drawdown(&mut self, equity_curve: &[EquityPoint]) {
        for point in drawdown_curve(equity_curve) {
            if point.drawdown > self.max_drawdown {
                self.max_drawdown = point.drawdown;
            }
            if point.drawdown_pct > self.max_drawdown_pct {
                self.max_drawdown_pct = point.drawdown_pct;
            }
        }
    }

    fn calculate_ratios(&mut self, equity_curve: &[EquityPoint]) {
        if self.max_drawdown_pct > Decimal::ZERO {
            self.calmar_ratio = (self.total_return_pct / self.max_drawdown_pct).to_f64();
        }

        let returns = daily_returns(equity_curve);
        if returns.len() < 2 {
            return;
        }
        let sigma = std_dev(&returns);
        if sigma > 0.0 {
            self.sharpe_ratio = Some(mean(&returns) / sigma * TRADING_DAYS_PER_YEAR.sqrt());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{curve, trade};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_statistics() {
        let trades = [trade(dec!(100), 2), trade(dec!(-50), 4), trade(dec!(50), 6)];
        let report = PerformanceReport::calculate(&trades, &curve(&[1000, 1100]), dec!(1000)).unwrap();
        assert_eq!(report.total_trades, 3);
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.losing_trades, 1);
        assert_eq!(report.gross_profit, dec!(150));
        assert_eq!(report.gross_loss, dec!(50));
        assert_eq!(report.profit_factor, Some(dec!(3)));
        assert_eq!(report.average_win, dec!(75));
        assert_eq!(report.average_loss, dec!(50));
        assert_eq!(report.average_trade_pnl, dec!(100) / dec!(3));
        assert_eq!(report.total_commission, dec!(6));
        assert_eq!(report.total_slippage, dec!(1.5));
        assert_relative_eq!(report.average_holding_days, 4.0);
        assert_eq!(report.total_return, dec!(100));
        assert_eq!(report.total_return_pct, dec!(10));
    }

    #[test]
    fn drawdown_and_calmar() {
        let report = PerformanceReport::calculate(&[], &curve(&[1200, 900, 1100]), dec!(1000)).unwrap();
        assert_eq!(report.max_drawdown, dec!(300));
        assert_eq!(report.max_drawdown_pct, dec!(25));
        assert_eq!(report.total_return_pct, dec!(10));
        assert_relative_eq!(report.calmar_ratio.unwrap(), 0.4);
        assert_eq!(report.win_rate_pct, None);
    }

    #[test]
    fn sharpe_is_annualised() {
        // returns +10%, -10% from the opening 100: mean 0 -> sharpe 0
        let flat = PerformanceReport::calculate(&[], &curve(&[110, 99]), dec!(100)).unwrap();
        assert_relative_eq!(flat.sharpe_ratio.unwrap(), 0.0, epsilon = 1e-12);

        let up = PerformanceReport::calculate(&[], &curve(&[102]), dec!(100));
        assert_eq!(up.unwrap().sharpe_ratio, None);

        // returns 2%, 1%: mean 1.5%, population sd 0.5% -> 3 * sqrt(252)
        let points = vec![
            EquityPoint { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), equity: dec!(102) },
            EquityPoint { date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), equity: dec!(103.02) },
        ];
        let report = PerformanceReport::calculate(&[], &points, dec!(100)).unwrap();
        assert_relative_eq!(report.sharpe_ratio.unwrap(), 3.0 * 252f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn constant_equity_has_no_sharpe() {
        let report = PerformanceReport::calculate(&[], &curve(&[100, 100, 100]), dec!(100)).unwrap();
        assert_eq!(report.sharpe_ratio, None);
        assert_eq!(report.calmar_ratio, None);
    }

    #[test]
    fn losses_from_the_first_day_count_as_drawdown() {
        let report = PerformanceReport::calculate(&[], &curve(&[95000, 93000, 89000]), dec!(100000)).unwrap();
        assert_eq!(report.total_return, dec!(-11000));
        assert_eq!(report.max_drawdown, dec!(11000));
        assert_eq!(report.max_drawdown_pct, dec!(11));
    }

    #[test]
    fn rejects_non_positive_capital() {
        assert!(PerformanceReport::calculate(&[], &[], dec!(0)).is_err());
    }
}
