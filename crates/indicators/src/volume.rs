//! Volume relative to its trailing average.

use crate::error::{require, require_period, IndicatorError};
use crate::stats::{mean, tail};
use crate::volumes;
use core_types::PriceBar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub average_volume: f64,
    /// Latest volume divided by the window average; 0 when the average is 0.
    pub volume_ratio: f64,
    pub is_above_average: bool,
}

/// Average volume over the trailing `period` bars (including the latest) and the
/// latest bar's ratio to it.
pub fn volume_profile(bars: &[PriceBar], period: usize) -> Result<VolumeProfile, IndicatorError> {
    require_period("VolumeProfile", period)?;
    require("VolumeProfile", period, bars.len())?;

    let all = volumes(bars);
    let average_volume = mean(tail(&all, period));
    let latest = all[all.len() - 1];
    let volume_ratio = if average_volume == 0.0 { 0.0 } else { latest / average_volume };

    Ok(VolumeProfile {
        average_volume,
        volume_ratio,
        is_above_average: volume_ratio > 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars;
    use approx::assert_relative_eq;

    #[test]
    fn spike_on_latest_bar() {
        let mut data = vec![(11.0, 9.0, 10.0, 1000.0); 19];
        data.push((11.0, 9.0, 10.0, 3000.0));
        let profile = volume_profile(&bars(&data), 20).unwrap();
        assert_relative_eq!(profile.average_volume, 1100.0);
        assert_relative_eq!(profile.volume_ratio, 3000.0 / 1100.0);
        assert!(profile.is_above_average);
    }

    #[test]
    fn flat_volume_is_not_above_average() {
        let profile = volume_profile(&bars(&[(11.0, 9.0, 10.0, 500.0); 20]), 20).unwrap();
        assert_relative_eq!(profile.volume_ratio, 1.0);
        assert!(!profile.is_above_average);
    }

    #[test]
    fn zero_volume_window() {
        let profile = volume_profile(&bars(&[(11.0, 9.0, 10.0, 0.0); 5]), 5).unwrap();
        assert_eq!(profile.volume_ratio, 0.0);
    }
}
