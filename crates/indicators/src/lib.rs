//! # Vantage Indicator Library
//!
//! Pure numerical functions over price sequences and bar sequences. Every function
//! reads its input, never mutates it, and fails with
//! [`IndicatorError::InsufficientData`] when the history is shorter than the
//! window it needs.
//!
//! Functions return the value at the most recent point of the input. Where a
//! strategy needs the whole history (e.g. the ATR moving average used by the
//! breakout generator), a `*_series` variant is provided.
//!
//! All math is `f64`. Callers holding `Decimal` prices convert at the boundary with
//! [`closes`] / [`volumes`] or the `*_f64` accessors on `PriceBar`.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod error;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod stats;
pub mod volume;
pub mod zscore;

pub use adx::{adx, AdxOutput};
pub use atr::{atr, atr_series, true_range};
pub use bollinger::{bollinger_bands, BollingerBands};
pub use donchian::{donchian_channels, DonchianChannels};
pub use error::IndicatorError;
pub use macd::{macd, MacdOutput};
pub use moving_average::{ema, ema_series, sma};
pub use rsi::rsi;
pub use volume::{volume_profile, VolumeProfile};
pub use zscore::z_score;

use core_types::PriceBar;

/// Closing prices of `bars` as `f64`, oldest first.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::close_f64).collect()
}

/// Volumes of `bars` as `f64`, oldest first.
pub fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::volume_f64).collect()
}
