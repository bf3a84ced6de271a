//! Four independent position sizers and their median.
//!
//! Each sizer is a pure function returning whole shares. The recommended size is
//! the median of the four, which leans conservative when one sizer is optimistic.

use configuration::SizingSettings;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything the sizers need to know about a prospective entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingInputs {
    pub capital: Decimal,
    pub price: Decimal,
    /// Signal confidence in [0, 1].
    pub confidence: f64,
    pub atr: Decimal,
    /// Historical win probability in [0, 1].
    pub win_rate: f64,
    pub avg_win: Decimal,
    /// Average losing trade, as a positive amount.
    pub avg_loss: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRecommendation {
    pub fixed_percent: u64,
    pub kelly: u64,
    pub inverse_volatility: u64,
    pub confidence_scaled: u64,
    /// Median of the four.
    pub recommended: u64,
}

fn shares(capital: Decimal, fraction: Decimal, price: Decimal) -> u64 {
    if price <= Decimal::ZERO || capital <= Decimal::ZERO || fraction <= Decimal::ZERO {
        return 0;
    }
    (capital * fraction / price).floor().to_u64().unwrap_or(0)
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// A fixed fraction of capital.
pub fn fixed_percent_size(capital: Decimal, price: Decimal, fraction: Decimal) -> u64 {
    shares(capital, fraction, price)
}

/// Quarter-Kelly: `f = p - (1 - p) / b` with `b = avg_win / avg_loss`, divided by
/// four and clamped to `[0, cap]`.
pub fn kelly_size(
    capital: Decimal,
    price: Decimal,
    win_rate: f64,
    avg_win: Decimal,
    avg_loss: Decimal,
    cap: Decimal,
) -> u64 {
    if avg_win <= Decimal::ZERO || avg_loss <= Decimal::ZERO {
        return 0;
    }
    let payoff = (avg_win / avg_loss).to_f64().unwrap_or_default();
    if payoff <= 0.0 {
        return 0;
    }
    let p = win_rate.clamp(0.0, 1.0);
    let kelly = p - (1.0 - p) / payoff;
    let fraction = decimal(kelly / 4.0).max(Decimal::ZERO).min(cap);
    shares(capital, fraction, price)
}

/// Baseline risk scaled up in calm markets: the multiplier is
/// `baseline / (atr / price)`, capped at `max_multiplier`.
pub fn inverse_volatility_size(
    capital: Decimal,
    price: Decimal,
    atr: Decimal,
    baseline: Decimal,
    max_multiplier: Decimal,
) -> u64 {
    if price <= Decimal::ZERO {
        return 0;
    }
    let volatility = atr.abs() / price;
    let multiplier = if volatility.is_zero() {
        max_multiplier
    } else {
        (baseline / volatility).min(max_multiplier)
    };
    shares(capital, baseline * multiplier, price)
}

/// Linear interpolation between `min_fraction` (confidence 0) and `max_fraction`
/// (confidence 1).
pub fn confidence_scaled_size(
    capital: Decimal,
    price: Decimal,
    confidence: f64,
    min_fraction: Decimal,
    max_fraction: Decimal,
) -> u64 {
    let confidence = decimal(confidence.clamp(0.0, 1.0));
    let fraction = min_fraction + (max_fraction - min_fraction) * confidence;
    shares(capital, fraction, price)
}

/// Median of the given sizes; the mean of the middle two (floored) for an even count.
pub fn median_shares(sizes: &[u64]) -> u64 {
    if sizes.is_empty() {
        return 0;
    }
    let mut sorted = sizes.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2
    }
}

/// Runs all four sizers and recommends their median.
pub fn determine_optimal_position_size(inputs: &SizingInputs, settings: &SizingSettings) -> SizingRecommendation {
    let fixed_percent = fixed_percent_size(inputs.capital, inputs.price, settings.fixed_fraction);
    let kelly = kelly_size(
        inputs.capital,
        inputs.price,
        inputs.win_rate,
        inputs.avg_win,
        inputs.avg_loss,
        settings.kelly_cap,
    );
    let inverse_volatility = inverse_volatility_size(
        inputs.capital,
        inputs.price,
        inputs.atr,
        settings.inverse_vol_baseline,
        settings.inverse_vol_max_multiplier,
    );
    let confidence_scaled = confidence_scaled_size(
        inputs.capital,
        inputs.price,
        inputs.confidence,
        settings.confidence_min_fraction,
        settings.confidence_max_fraction,
    );
    let recommended = median_shares(&[fixed_percent, kelly, inverse_volatility, confidence_scaled]);

    SizingRecommendation {
        fixed_percent,
        kelly,
        inverse_volatility,
        confidence_scaled,
        recommended,
    }
}
