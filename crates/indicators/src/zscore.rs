//! Z-Score of a price against the trailing window's mean and population deviation.

use crate::error::{require, require_period, IndicatorError};
use crate::stats::{mean, std_dev, tail};

/// `(current_price - mean) / sigma` over the trailing `period` prices; 0 when sigma is 0.
pub fn z_score(current_price: f64, prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_period("ZScore", period)?;
    require("ZScore", period, prices.len())?;

    let window = tail(prices, period);
    let sigma = std_dev(window);
    if sigma == 0.0 {
        return Ok(0.0);
    }
    Ok((current_price - mean(window)) / sigma)
}
