//! Average Directional Index.
//!
//! 1. +DM / -DM from consecutive highs and lows.
//! 2. +DM, -DM and TR smoothed with the SMA-seeded EMA.
//! 3. `+DI = 100 * sm(+DM) / sm(TR)`, `-DI = 100 * sm(-DM) / sm(TR)`.
//! 4. `DX = 100 * |+DI - -DI| / (+DI + -DI)`.
//! 5. ADX = EMA of the DX series over `period`.
//!
//! Lookback: `2 * period` bars (period for DI smoothing, then period for ADX smoothing).

use crate::atr::true_range;
use crate::error::{require, require_period, IndicatorError};
use crate::moving_average::ema_series;
use core_types::PriceBar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// The unsmoothed directional index at the latest bar.
    pub dx: f64,
}

pub fn adx(bars: &[PriceBar], period: usize) -> Result<AdxOutput, IndicatorError> {
    require_period("ADX", period)?;
    require("ADX", 2 * period, bars.len())?;

    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| {
            let up_move = w[1].high_f64() - w[0].high_f64();
            let down_move = w[0].low_f64() - w[1].low_f64();
            let plus = if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 };
            let minus = if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 };
            (plus, minus)
        })
        .unzip();

    let smooth_tr = ema_series(&true_range(bars), period)?;
    let smooth_plus = ema_series(&plus_dm, period)?;
    let smooth_minus = ema_series(&minus_dm, period)?;

    let mut plus_di = 0.0;
    let mut minus_di = 0.0;
    let dx: Vec<f64> = smooth_tr
        .iter()
        .zip(smooth_plus.iter().zip(smooth_minus.iter()))
        .map(|(tr, (plus, minus))| {
            if *tr == 0.0 {
                plus_di = 0.0;
                minus_di = 0.0;
                return 0.0;
            }
            plus_di = 100.0 * plus / tr;
            minus_di = 100.0 * minus / tr;
            let di_sum = plus_di + minus_di;
            if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            }
        })
        .collect();

    let adx_series = ema_series(&dx, period)?;
    Ok(AdxOutput {
        adx: adx_series[adx_series.len() - 1],
        plus_di,
        minus_di,
        dx: dx[dx.len() - 1],
    })
}
