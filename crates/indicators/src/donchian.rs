//! Donchian Channels: highest high and lowest low over a trailing window.

use crate::error::{require, require_period, IndicatorError};
use core_types::PriceBar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DonchianChannels {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Channels over the last `period` bars of `bars`.
///
/// Breakout detection should pass the bars *preceding* the bar being tested, since a
/// window containing the current bar always contains its high.
pub fn donchian_channels(bars: &[PriceBar], period: usize) -> Result<DonchianChannels, IndicatorError> {
    require_period("DonchianChannels", period)?;
    require("DonchianChannels", period, bars.len())?;

    let window = &bars[bars.len() - period..];
    let upper = window.iter().map(PriceBar::high_f64).fold(f64::MIN, f64::max);
    let lower = window.iter().map(PriceBar::low_f64).fold(f64::MAX, f64::min);

    Ok(DonchianChannels {
        upper,
        middle: (upper + lower) / 2.0,
        lower,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars;

    #[test]
    fn channel_bounds_window_extremes() {
        let data = bars(&[
            (50.0, 1.0, 20.0, 1.0), // outside the window
            (12.0, 8.0, 10.0, 1.0),
            (15.0, 9.0, 14.0, 1.0),
            (13.0, 7.0, 11.0, 1.0),
        ]);
        let ch = donchian_channels(&data, 3).unwrap();
        assert_eq!(ch.upper, 15.0);
        assert_eq!(ch.lower, 7.0);
        assert_eq!(ch.middle, 11.0);
    }

    #[test]
    fn insufficient_bars() {
        let data = bars(&[(12.0, 8.0, 10.0, 1.0)]);
        assert!(donchian_channels(&data, 2).is_err());
    }
}
