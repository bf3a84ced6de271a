//! Simple and exponential moving averages.
//!
//! The EMA is seeded with the SMA of the first `period` values and then rolled
//! forward with multiplier `2 / (period + 1)` through the rest of the series.

use crate::error::{require, require_period, IndicatorError};
use crate::stats::{mean, tail};

/// Arithmetic mean of the trailing `period` prices.
pub fn sma(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_period("SMA", period)?;
    require("SMA", period, prices.len())?;
    Ok(mean(tail(prices, period)))
}

/// EMA at the last point of `prices`.
pub fn ema(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    let series = ema_series(prices, period)?;
    // ema_series always yields at least the seed value.
    Ok(series[series.len() - 1])
}

/// EMA values from index `period - 1` (the SMA seed) to the end of `prices`.
///
/// The returned vector has `prices.len() - period + 1` elements.
pub fn ema_series(prices: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    require_period("EMA", period)?;
    require("EMA", period, prices.len())?;

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut current = mean(&prices[..period]);
    let mut series = Vec::with_capacity(prices.len() - period + 1);
    series.push(current);

    for price in &prices[period..] {
        current = (price - current) * multiplier + current;
        series.push(current);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_uses_trailing_window() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(sma(&prices, 3).unwrap(), 4.0);
    }

    #[test]
    fn sma_insufficient_data() {
        let err = sma(&[1.0, 2.0], 3).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                indicator: "SMA",
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            ema(&[1.0], 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn ema_seeds_with_sma_then_rolls_forward() {
        // seed = mean(2, 4, 6) = 4; k = 0.5; next = (8 - 4) * 0.5 + 4 = 6
        let prices = [2.0, 4.0, 6.0, 8.0];
        let series = ema_series(&prices, 3).unwrap();
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series[0], 4.0);
        assert_relative_eq!(series[1], 6.0);
        assert_relative_eq!(ema(&prices, 3).unwrap(), 6.0);
    }

    #[test]
    fn ema_with_exact_window_equals_sma() {
        let prices = [3.0, 5.0, 7.0];
        assert_relative_eq!(ema(&prices, 3).unwrap(), sma(&prices, 3).unwrap());
    }

    #[test]
    fn ema_does_not_mutate_input() {
        let prices = vec![1.0, 2.0, 3.0, 4.0];
        let before = prices.clone();
        let _ = ema(&prices, 2).unwrap();
        assert_eq!(prices, before);
    }
}
