//! Relative Strength Index with Wilder smoothing.
//!
//! - First averages: simple mean of the first `period` gains / losses.
//! - Subsequent: `avg = (prev_avg * (period - 1) + current) / period`.
//! - `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`, or 100 when `avg_loss == 0`.

use crate::error::{require, require_period, IndicatorError};

pub fn rsi(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_period("RSI", period)?;
    // `period` price changes need `period + 1` prices.
    require("RSI", period + 1, prices.len())?;

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / period as f64;

    let smoothing = (period - 1) as f64;
    for change in &changes[period..] {
        avg_gain = (avg_gain * smoothing + change.max(0.0)) / period as f64;
        avg_loss = (avg_loss * smoothing + (-change).max(0.0)) / period as f64;
    }

    if avg_loss == 0.0 {
        return Ok(100.0);
    }
    let rs = avg_gain / avg_loss;
    Ok((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
