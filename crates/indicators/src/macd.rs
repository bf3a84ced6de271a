//! Moving Average Convergence/Divergence.
//!
//! The MACD line is `EMA(fast) - EMA(slow)` evaluated at every index from
//! `slow - 1` onwards. The signal line is an SMA-seeded `EMA(signal_period)` over
//! that whole MACD series. While fewer than `signal_period` MACD points exist the
//! signal line is the mean of the points available.

use crate::error::{require, require_period, IndicatorError};
use crate::moving_average::ema_series;
use crate::stats::mean;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdOutput, IndicatorError> {
    require_period("MACD", fast)?;
    require_period("MACD", slow)?;
    require_period("MACD", signal_period)?;
    if fast >= slow {
        return Err(IndicatorError::InvalidPeriod {
            indicator: "MACD",
            reason: format!("fast period {fast} must be shorter than slow period {slow}"),
        });
    }
    require("MACD", slow, prices.len())?;

    let fast_series = ema_series(prices, fast)?;
    let slow_series = ema_series(prices, slow)?;
    // fast_series starts at index fast-1, slow_series at slow-1; align on the latter.
    let offset = slow - fast;
    let macd_series: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_series[i + offset] - slow_value)
        .collect();

    let macd_value = macd_series[macd_series.len() - 1];
    let signal = if macd_series.len() >= signal_period {
        let signal_series = ema_series(&macd_series, signal_period)?;
        signal_series[signal_series.len() - 1]
    } else {
        mean(&macd_series)
    };

    Ok(MacdOutput {
        macd: macd_value,
        signal,
        histogram: macd_value - signal,
    })
}
