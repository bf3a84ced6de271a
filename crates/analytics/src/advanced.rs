//! Risk-adjusted and distributional metrics over a completed run.
//!
//! All figures are computed from the day-end equity curve and the trade log only;
//! no benchmark series is consumed. The information ratio therefore measures
//! against a zero-return benchmark, and the Treynor ratio assumes a beta of 1.

use crate::curve::{daily_returns, drawdown_curve, EquityPoint};
use crate::error::AnalyticsError;
use crate::TRADING_DAYS_PER_YEAR;
use chrono::{Datelike, NaiveDate};
use core_types::Trade;
use indicators::stats::{mean, std_dev};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakStats {
    /// Length of the streak in progress: positive for wins, negative for losses.
    pub current_streak: i64,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
    pub average_win_streak: f64,
    pub average_loss_streak: f64,
}

/// Empirical value-at-risk at one confidence level, as daily-return quantiles
/// (a loss is negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    pub value_at_risk: f64,
    /// Mean of the returns at or below the VaR quantile.
    pub conditional_value_at_risk: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRecovery {
    pub recovered_drawdowns: usize,
    pub average_recovery_days: Option<f64>,
    pub longest_recovery_days: Option<i64>,
    /// Days spent in a drawdown that had not recovered by the last point.
    pub unrecovered_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    pub sortino_ratio: Option<f64>,
    pub information_ratio: Option<f64>,
    pub treynor_ratio: Option<f64>,
    pub streaks: StreakStats,
    pub tail_95: Option<TailRisk>,
    pub tail_99: Option<TailRisk>,
    pub ulcer_index: f64,
    pub monthly_win_rate_pct: Option<f64>,
    /// R-squared of a linear fit to log equity; 1.0 is a perfectly steady curve.
    pub stability: Option<f64>,
    pub drawdown_recovery: DrawdownRecovery,
}

impl AdvancedMetrics {
    pub fn calculate(trades: &[Trade], equity_curve: &[EquityPoint]) -> Result<Self, AnalyticsError> {
        if equity_curve.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "advanced metrics need at least 2 equity points, got {}",
                equity_curve.len()
            )));
        }
        let returns = daily_returns(equity_curve);

        Ok(Self {
            sortino_ratio: sortino_ratio(&returns),
            information_ratio: information_ratio(&returns),
            treynor_ratio: treynor_ratio(&returns),
            streaks: streak_stats(trades),
            tail_95: tail_risk(&returns, 0.95),
            tail_99: tail_risk(&returns, 0.99),
            ulcer_index: ulcer_index(equity_curve),
            monthly_win_rate_pct: monthly_win_rate(equity_curve),
            stability: stability_of_returns(equity_curve),
            drawdown_recovery: drawdown_recovery(equity_curve),
        })
    }
}

/// Mean return over the standard deviation of the negative returns, annualised.
pub fn sortino_ratio(returns: &[f64]) -> Option<f64> {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let deviation = std_dev(&downside);
    (deviation > 0.0).then(|| mean(returns) / deviation * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Active return over tracking error against a zero-return benchmark, annualised.
pub fn information_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let tracking_error = std_dev(returns);
    (tracking_error > 0.0).then(|| mean(returns) / tracking_error * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualised mean return per unit of beta, with beta taken as 1.
pub fn treynor_ratio(returns: &[f64]) -> Option<f64> {
    const BETA: f64 = 1.0;
    (!returns.is_empty()).then(|| mean(returns) * TRADING_DAYS_PER_YEAR / BETA)
}

/// Win and loss streaks over the trade log in order. Break-even trades count as losses.
pub fn streak_stats(trades: &[Trade]) -> StreakStats {
    let mut win_streaks = Vec::new();
    let mut loss_streaks = Vec::new();
    let mut current: i64 = 0;

    for trade in trades {
        if trade.is_win() {
            if current < 0 {
                loss_streaks.push(current.unsigned_abs() as usize);
                current = 0;
            }
            current += 1;
        } else {
            if current > 0 {
                win_streaks.push(current as usize);
                current = 0;
            }
            current -= 1;
        }
    }
    if current > 0 {
        win_streaks.push(current as usize);
    } else if current < 0 {
        loss_streaks.push(current.unsigned_abs() as usize);
    }

    let average = |streaks: &[usize]| {
        if streaks.is_empty() {
            0.0
        } else {
            streaks.iter().sum::<usize>() as f64 / streaks.len() as f64
        }
    };

    StreakStats {
        current_streak: current,
        longest_win_streak: win_streaks.iter().copied().max().unwrap_or(0),
        longest_loss_streak: loss_streaks.iter().copied().max().unwrap_or(0),
        average_win_streak: average(&win_streaks),
        average_loss_streak: average(&loss_streaks),
    }
}

/// Historical VaR and CVaR at `confidence` (e.g. 0.95). No distribution is assumed.
pub fn tail_risk(returns: &[f64], confidence: f64) -> Option<TailRisk> {
    if returns.is_empty() {
        return None;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let index = (((1.0 - confidence) * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(TailRisk {
        value_at_risk: sorted[index],
        conditional_value_at_risk: mean(&sorted[..=index]),
    })
}

/// Root-mean-square of the percentage drawdowns.
pub fn ulcer_index(equity_curve: &[EquityPoint]) -> f64 {
    let squared: Vec<f64> = drawdown_curve(equity_curve)
        .iter()
        .filter_map(|p| p.drawdown_pct.to_f64())
        .map(|pct| pct * pct)
        .collect();
    mean(&squared).sqrt()
}

/// Share of calendar months with a positive return, in percent.
///
/// A month's return runs from the previous month's last equity (or the month's
/// own first point, for the first month) to its last equity.
pub fn monthly_win_rate(equity_curve: &[EquityPoint]) -> Option<f64> {
    let month_of = |date: NaiveDate| (date.year(), date.month());

    let mut month_ends: Vec<(Decimal, Decimal)> = Vec::new();
    let mut current_month = None;
    let mut base = equity_curve.first()?.equity;
    for point in equity_curve {
        let month = month_of(point.date);
        if current_month != Some(month) {
            if let Some(&(_, end)) = month_ends.last() {
                base = end;
            }
            month_ends.push((base, point.equity));
            current_month = Some(month);
        } else if let Some(last) = month_ends.last_mut() {
            last.1 = point.equity;
        }
    }

    let winners = month_ends.iter().filter(|(start, end)| end > start).count();
    Some(winners as f64 / month_ends.len() as f64 * 100.0)
}

/// R-squared of an ordinary least-squares fit of log equity against time.
pub fn stability_of_returns(equity_curve: &[EquityPoint]) -> Option<f64> {
    let log_equity: Vec<f64> = equity_curve
        .iter()
        .filter_map(|p| p.equity.to_f64())
        .filter(|v| *v > 0.0)
        .map(f64::ln)
        .collect();
    if log_equity.len() < 3 {
        return None;
    }

    let xs: Vec<f64> = (0..log_equity.len()).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(&log_equity);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(&log_equity) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean) * (x - x_mean);
        syy += (y - y_mean) * (y - y_mean);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy * sxy / (sxx * syy))
}

/// Calendar days from the first day under water to the day a new high-water
/// mark is reached, for every drawdown in the curve.
pub fn drawdown_recovery(equity_curve: &[EquityPoint]) -> DrawdownRecovery {
    let Some(first) = equity_curve.first() else {
        return DrawdownRecovery::default();
    };

    let mut peak = first.equity;
    let mut under_water_since: Option<NaiveDate> = None;
    let mut recoveries = Vec::new();
    for point in equity_curve {
        if point.equity >= peak {
            if let Some(start) = under_water_since.take() {
                recoveries.push((point.date - start).num_days());
            }
            peak = point.equity;
        } else if under_water_since.is_none() {
            under_water_since = Some(point.date);
        }
    }

    let unrecovered_days = match (under_water_since, equity_curve.last()) {
        (Some(start), Some(last)) => Some((last.date - start).num_days()),
        _ => None,
    };
    DrawdownRecovery {
        recovered_drawdowns: recoveries.len(),
        average_recovery_days: (!recoveries.is_empty())
            .then(|| recoveries.iter().sum::<i64>() as f64 / recoveries.len() as f64),
        longest_recovery_days: recoveries.iter().copied().max(),
        unrecovered_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{curve, trade};
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn streaks_follow_trade_order() {
        let pnls = [dec!(10), dec!(5), dec!(-1), dec!(3), dec!(-2), dec!(0), dec!(-4)];
        let trades: Vec<_> = pnls.iter().map(|&p| trade(p, 1)).collect();
        let stats = streak_stats(&trades);
        assert_eq!(stats.current_streak, -3);
        assert_eq!(stats.longest_win_streak, 2);
        assert_eq!(stats.longest_loss_streak, 3);
        assert_relative_eq!(stats.average_win_streak, 1.5);
        assert_relative_eq!(stats.average_loss_streak, 2.0);
    }

    #[test]
    fn no_trades_no_streaks() {
        assert_eq!(streak_stats(&[]), StreakStats::default());
    }

    #[test]
    fn empirical_tail_risk() {
        let returns: Vec<f64> = (0..20).map(|i| (i as f64 - 10.0) / 100.0).collect();
        let tail = tail_risk(&returns, 0.95).unwrap();
        assert_relative_eq!(tail.value_at_risk, -0.09, epsilon = 1e-12);
        assert_relative_eq!(tail.conditional_value_at_risk, -0.095, epsilon = 1e-12);

        let extreme = tail_risk(&returns, 0.99).unwrap();
        assert_relative_eq!(extreme.value_at_risk, -0.10);
        assert_relative_eq!(extreme.conditional_value_at_risk, -0.10);
        assert_eq!(tail_risk(&[], 0.95), None);
    }

    #[test]
    fn sortino_uses_downside_deviation_only() {
        let returns = [0.02, -0.01, 0.03, -0.03];
        // mean 0.0025, downside sd of (-0.01, -0.03) is 0.01
        assert_relative_eq!(sortino_ratio(&returns).unwrap(), 0.25 * 252f64.sqrt(), epsilon = 1e-9);
        assert_eq!(sortino_ratio(&[0.01, 0.02]), None);
    }

    #[test]
    fn treynor_assumes_unit_beta() {
        assert_relative_eq!(treynor_ratio(&[0.01, 0.03]).unwrap(), 0.02 * 252.0, epsilon = 1e-12);
    }

    #[test]
    fn ulcer_index_is_rms_of_percent_drawdowns() {
        // drawdowns 0, 0, 25%, 0
        assert_relative_eq!(ulcer_index(&curve(&[100, 120, 90, 130])), 12.5);
    }

    #[test]
    fn recovery_time_in_calendar_days() {
        // under water from day 2, new high on day 4; under water again from day 5
        let recovery = drawdown_recovery(&curve(&[100, 120, 110, 100, 125, 120, 118]));
        assert_eq!(recovery.recovered_drawdowns, 1);
        assert_eq!(recovery.longest_recovery_days, Some(2));
        assert_eq!(recovery.average_recovery_days, Some(2.0));
        assert_eq!(recovery.unrecovered_days, Some(1));
    }

    #[test]
    fn monthly_win_rate_chains_month_ends() {
        let point = |y, m, d, v| EquityPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            equity: Decimal::from(v),
        };
        let points = [
            point(2024, 1, 2, 100),
            point(2024, 1, 31, 110),
            point(2024, 2, 1, 90),
            point(2024, 2, 29, 105),
            point(2024, 3, 1, 120),
        ];
        // Jan 100 -> 110 up, Feb 110 -> 105 down, Mar 105 -> 120 up
        assert_relative_eq!(monthly_win_rate(&points).unwrap(), 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn steady_growth_is_perfectly_stable() {
        let values: Vec<i64> = (0..10).map(|i| 1000 * 2i64.pow(i)).collect();
        assert_relative_eq!(stability_of_returns(&curve(&values)).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(stability_of_returns(&curve(&[100, 100, 100])), None);
    }

    #[test]
    fn needs_two_points() {
        assert!(matches!(
            AdvancedMetrics::calculate(&[], &curve(&[100])),
            Err(AnalyticsError::NotEnoughData(_))
        ));
        let metrics = AdvancedMetrics::calculate(&[], &curve(&[100, 101, 99, 102])).unwrap();
        assert!(metrics.tail_95.is_some());
    }
}
