//! Bollinger Bands: SMA middle band with `k` population standard deviations either side.

use crate::error::{require, require_period, IndicatorError};
use crate::stats::{mean, std_dev, tail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(upper - lower) / middle`; zero when the middle band is zero.
    pub bandwidth: f64,
}

pub fn bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev_multiplier: f64,
) -> Result<BollingerBands, IndicatorError> {
    require_period("BollingerBands", period)?;
    require("BollingerBands", period, prices.len())?;

    let window = tail(prices, period);
    let middle = mean(window);
    let sigma = std_dev(window);
    let upper = middle + std_dev_multiplier * sigma;
    let lower = middle - std_dev_multiplier * sigma;
    let bandwidth = if middle == 0.0 { 0.0 } else { (upper - lower) / middle };

    Ok(BollingerBands {
        upper,
        middle,
        lower,
        bandwidth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moving_average::sma;
    use approx::assert_relative_eq;

    #[test]
    fn middle_band_is_sma() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bands = bollinger_bands(&prices, 20, 2.0).unwrap();
        assert_eq!(bands.middle, sma(&prices, 20).unwrap());
        assert!(bands.upper > bands.middle && bands.middle > bands.lower);
    }

    #[test]
    fn hand_computed_bands() {
        // window 2, 4, 6, 8: mean 5, sigma sqrt(5)
        let bands = bollinger_bands(&[2.0, 4.0, 6.0, 8.0], 4, 2.0).unwrap();
        let sigma = 5.0_f64.sqrt();
        assert_relative_eq!(bands.upper, 5.0 + 2.0 * sigma);
        assert_relative_eq!(bands.lower, 5.0 - 2.0 * sigma);
        assert_relative_eq!(bands.bandwidth, 4.0 * sigma / 5.0);
    }

    #[test]
    fn flat_prices_collapse_the_bands() {
        let bands = bollinger_bands(&[10.0; 20], 20, 2.0).unwrap();
        assert_eq!(bands.upper, bands.lower);
        assert_eq!(bands.bandwidth, 0.0);
    }
}
