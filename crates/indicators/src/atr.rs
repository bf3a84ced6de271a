//! Average True Range.
//!
//! True range is `max(high - low, |high - prev_close|, |low - prev_close|)`, so the
//! first bar only provides the previous close. The TR series is smoothed with the
//! SMA-seeded EMA from [`crate::moving_average`].

use crate::error::{require, require_period, IndicatorError};
use crate::moving_average::ema_series;
use core_types::PriceBar;

/// True range for every bar after the first; `bars.len() - 1` values.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let prev_close = w[0].close_f64();
            let high = w[1].high_f64();
            let low = w[1].low_f64();
            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}

/// ATR at the most recent bar. Needs `period + 1` bars.
pub fn atr(bars: &[PriceBar], period: usize) -> Result<f64, IndicatorError> {
    let series = atr_series(bars, period)?;
    Ok(series[series.len() - 1])
}

/// ATR from the first fully-seeded bar to the most recent one.
pub fn atr_series(bars: &[PriceBar], period: usize) -> Result<Vec<f64>, IndicatorError> {
    require_period("ATR", period)?;
    require("ATR", period + 1, bars.len())?;
    ema_series(&true_range(bars), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars;
    use approx::assert_relative_eq;

    #[test]
    fn true_range_uses_gaps() {
        // Gap up: prev close 10, bar 14-13 -> TR = |14 - 10| = 4
        let data = bars(&[(10.5, 9.5, 10.0, 1.0), (14.0, 13.0, 13.5, 1.0)]);
        assert_eq!(true_range(&data), vec![4.0]);
    }

    #[test]
    fn constant_range_bars_have_constant_atr() {
        let data: Vec<_> = (0..20).map(|_| (11.0, 9.0, 10.0, 1.0)).collect();
        assert_relative_eq!(atr(&bars(&data), 14).unwrap(), 2.0);
    }

    #[test]
    fn atr_needs_period_plus_one_bars() {
        let data: Vec<_> = (0..14).map(|_| (11.0, 9.0, 10.0, 1.0)).collect();
        assert!(matches!(
            atr(&bars(&data), 14),
            Err(IndicatorError::InsufficientData { required: 15, available: 14, .. })
        ));
    }

    #[test]
    fn series_length_matches_seeded_points() {
        let data: Vec<_> = (0..30).map(|_| (11.0, 9.0, 10.0, 1.0)).collect();
        // 29 true ranges, seeded after 14 -> 16 values
        assert_eq!(atr_series(&bars(&data), 14).unwrap().len(), 16);
    }
}
