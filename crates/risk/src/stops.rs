use crate::error::RiskError;
use configuration::RiskLimits;
use core_types::PriceBar;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stops {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// ATR-based protective levels around a long entry.
///
/// Uses `|atr|`, so `stop_loss < entry_price < take_profit` holds even for a
/// malformed negative ATR. The stop never goes below zero.
pub fn calculate_stops(entry_price: Decimal, atr: Decimal, limits: &RiskLimits) -> Result<Stops, RiskError> {
    if entry_price <= Decimal::ZERO {
        return Err(RiskError::InvalidEntryPrice(entry_price));
    }
    let atr = atr.abs();
    if atr.is_zero() {
        return Err(RiskError::DegenerateAtr { entry_price });
    }

    let stop_loss = (entry_price - limits.stop_loss_atr_multiplier * atr).max(Decimal::ZERO);
    let take_profit = entry_price + limits.take_profit_atr_multiplier * atr;
    Ok(Stops {
        stop_loss,
        take_profit,
    })
}

/// Ratchets a trailing stop upwards.
///
/// Proposes `highest_price_since_entry * (1 - distance)` and returns the larger
/// of that and `current_stop`, so the stop never moves down. The current price
/// only matters once the caller has folded it into the high.
/// With trailing disabled the stop is returned unchanged.
pub fn update_trailing_stop(
    _current_price: Decimal,
    highest_price_since_entry: Decimal,
    current_stop: Decimal,
    limits: &RiskLimits,
) -> Decimal {
    if !limits.trailing_stop_enabled {
        return current_stop;
    }
    let proposed = highest_price_since_entry * (Decimal::ONE - limits.trailing_stop_distance_pct);
    proposed.max(current_stop)
}

/// ATR over `limits.atr_period` at the latest bar, as a Decimal.
pub fn atr_for_stops(bars: &[PriceBar], limits: &RiskLimits) -> Result<Decimal, RiskError> {
    let value = indicators::atr(bars, limits.atr_period)?;
    Decimal::from_f64(value)
        .ok_or_else(|| RiskError::Calculation(format!("ATR {value} is not representable")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stops_use_atr_multipliers() {
        let stops = calculate_stops(dec!(100), dec!(5), &RiskLimits::default()).unwrap();
        assert_eq!(stops.stop_loss, dec!(90));
        assert_eq!(stops.take_profit, dec!(115));
    }

    #[test]
    fn negative_atr_is_treated_as_magnitude() {
        let stops = calculate_stops(dec!(100), dec!(-5), &RiskLimits::default()).unwrap();
        assert_eq!(stops.stop_loss, dec!(90));
        assert_eq!(stops.take_profit, dec!(115));
    }

    #[test]
    fn zero_atr_is_degenerate() {
        assert!(matches!(
            calculate_stops(dec!(100), dec!(0), &RiskLimits::default()),
            Err(RiskError::DegenerateAtr { .. })
        ));
    }

    #[test]
    fn huge_atr_floors_stop_at_zero() {
        let stops = calculate_stops(dec!(10), dec!(50), &RiskLimits::default()).unwrap();
        assert_eq!(stops.stop_loss, dec!(0));
        assert!(stops.stop_loss < dec!(10));
    }

    #[test]
    fn trailing_stop_ratchets_and_ignores_retracement() {
        let limits = RiskLimits::default();
        let stop = update_trailing_stop(dec!(110), dec!(110), dec!(90), &limits);
        assert_eq!(stop, dec!(107.80));
        // Price falls back: the stop holds.
        assert_eq!(update_trailing_stop(dec!(105), dec!(110), stop, &limits), stop);
        // A new high lifts it again.
        assert_eq!(update_trailing_stop(dec!(120), dec!(120), stop, &limits), dec!(117.60));
    }

    #[test]
    fn trailing_stop_trails_the_recorded_high_not_the_quote() {
        let limits = RiskLimits::default();
        // A quote above a stale high does not lift the stop on its own.
        assert_eq!(update_trailing_stop(dec!(130), dec!(110), dec!(90), &limits), dec!(107.80));
    }

    #[test]
    fn trailing_stop_never_lowers_a_tighter_stop() {
        let limits = RiskLimits::default();
        assert_eq!(update_trailing_stop(dec!(100), dec!(100), dec!(99.5), &limits), dec!(99.5));
    }

    #[test]
    fn disabled_trailing_returns_stop_unchanged() {
        let limits = RiskLimits {
            trailing_stop_enabled: false,
            ..RiskLimits::default()
        };
        assert_eq!(update_trailing_stop(dec!(200), dec!(200), dec!(90), &limits), dec!(90));
    }
}
