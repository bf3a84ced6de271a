//! # Vantage Analytics Engine
//!
//! Performance measurement for completed simulation runs. It acts as the
//! "unbiased judge" of the system.
//!
//! - **Layer 1 Logic:** a pure logic crate with no knowledge of external systems.
//! - **Stateless Calculation:** [`PerformanceReport::calculate`] and
//!   [`AdvancedMetrics::calculate`] take a trade log and a day-end equity curve
//!   and return plain values.

pub mod advanced;
pub mod curve;
pub mod error;
pub mod report;

pub use advanced::{AdvancedMetrics, DrawdownRecovery, StreakStats, TailRisk};
pub use curve::{daily_returns, drawdown_curve, with_opening_equity, DrawdownPoint, EquityPoint};
pub use error::AnalyticsError;
pub use report::PerformanceReport;

/// Annualisation factor for daily return statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::curve::EquityPoint;
    use chrono::NaiveDate;
    use core_types::{ExitReason, OrderSide, Trade};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Daily equity points starting 2024-01-01.
    pub fn curve(values: &[i64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: start + chrono::Duration::days(i as i64),
                equity: Decimal::from(v),
            })
            .collect()
    }

    pub fn trade(pnl: Decimal, holding_days: i64) -> Trade {
        let entry = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Trade {
            entry_date: entry,
            exit_date: entry + chrono::Duration::days(holding_days),
            symbol: "ACME".to_string(),
            side: OrderSide::Buy,
            entry_price: dec!(100),
            exit_price: dec!(100),
            quantity: 1,
            pnl,
            pnl_percent: pnl,
            commission: dec!(2),
            slippage: dec!(0.5),
            holding_period_days: holding_days,
            exit_reason: ExitReason::Signal,
        }
    }
}
