use crate::error::RiskError;
use configuration::RiskLimits;
use core_types::Position;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// The outcome of a position-size check.
///
/// `approved` is true only when the requested size passes unchanged. A reduced
/// size comes back with `approved == false` and the smaller `adjusted_quantity`;
/// a rejection always carries `adjusted_quantity == 0`. The adjusted quantity is
/// never larger than the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSizeDecision {
    pub approved: bool,
    pub adjusted_quantity: u64,
    pub reason: String,
}

impl PositionSizeDecision {
    fn reject(reason: String) -> Self {
        Self {
            approved: false,
            adjusted_quantity: 0,
            reason,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.adjusted_quantity == 0
    }
}

fn floor_shares(value: Decimal, price: Decimal) -> u64 {
    (value / price).floor().to_u64().unwrap_or(0)
}

/// Checks a proposed order against the portfolio limits, in order:
///
/// 1. single-position value cap (shrink to the cap),
/// 2. total exposure across open positions plus this order (shrink to the
///    remaining headroom, or reject when none is left),
/// 3. open-position count (reject outright at the maximum).
///
/// Each cap applies to the quantity left by the previous one.
pub fn validate_position_size(
    quantity: u64,
    price: Decimal,
    capital: Decimal,
    open_positions: &[Position],
    limits: &RiskLimits,
) -> Result<PositionSizeDecision, RiskError> {
    if price <= Decimal::ZERO {
        return Err(RiskError::InvalidEntryPrice(price));
    }
    if capital <= Decimal::ZERO {
        return Err(RiskError::InvalidParameters(format!(
            "capital must be positive, got {capital}"
        )));
    }
    if quantity == 0 {
        return Ok(PositionSizeDecision::reject("zero quantity requested".to_string()));
    }

    let mut adjusted = quantity;
    let mut notes = Vec::new();

    let single_cap = capital * limits.max_single_position_pct;
    if Decimal::from(adjusted) * price > single_cap {
        adjusted = floor_shares(single_cap, price);
        notes.push(format!(
            "reduced to {adjusted} shares by the {}% single-position cap",
            limits.max_single_position_pct * Decimal::ONE_HUNDRED
        ));
        if adjusted == 0 {
            return Ok(PositionSizeDecision::reject(format!(
                "one share at {price} exceeds the single-position cap of {single_cap}"
            )));
        }
    }

    let exposure: Decimal = open_positions.iter().map(Position::market_value).sum();
    let headroom = capital * limits.max_total_exposure_pct - exposure;
    if headroom <= Decimal::ZERO {
        return Ok(PositionSizeDecision::reject(format!(
            "total exposure {exposure} already at the {}% cap",
            limits.max_total_exposure_pct * Decimal::ONE_HUNDRED
        )));
    }
    if Decimal::from(adjusted) * price > headroom {
        adjusted = floor_shares(headroom, price);
        if adjusted == 0 {
            return Ok(PositionSizeDecision::reject(format!(
                "exposure headroom {headroom} is below one share at {price}"
            )));
        }
        notes.push(format!("reduced to {adjusted} shares by total exposure headroom {headroom}"));
    }

    if open_positions.len() >= limits.max_positions {
        return Ok(PositionSizeDecision::reject(format!(
            "already holding {} positions (max {})",
            open_positions.len(),
            limits.max_positions
        )));
    }

    let approved = adjusted == quantity;
    let reason = if approved {
        "within limits".to_string()
    } else {
        notes.join("; ")
    };
    Ok(PositionSizeDecision {
        approved,
        adjusted_quantity: adjusted,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, quantity: u64, price: Decimal) -> Position {
        Position {
            symbol: symbol.to_string(),
            quantity,
            entry_price: price,
            current_price: price,
        }
    }

    #[test]
    fn oversized_order_is_cut_to_single_position_cap() {
        let decision =
            validate_position_size(100, dec!(100), dec!(10000), &[], &RiskLimits::default()).unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.adjusted_quantity, 20);
        assert!(decision.reason.contains("single-position"));
    }

    #[test]
    fn order_within_limits_is_approved_unchanged() {
        let decision =
            validate_position_size(10, dec!(100), dec!(10000), &[], &RiskLimits::default()).unwrap();
        assert!(decision.approved);
        assert_eq!(decision.adjusted_quantity, 10);
    }

    #[test]
    fn exposure_headroom_shrinks_order() {
        // 5000 of 6000 allowed exposure used; 1000 left -> 10 shares at 100.
        let open = vec![position("A", 25, dec!(100)), position("B", 25, dec!(100))];
        let decision =
            validate_position_size(15, dec!(100), dec!(10000), &open, &RiskLimits::default()).unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.adjusted_quantity, 10);
        assert!(decision.reason.contains("exposure"));
    }

    #[test]
    fn no_headroom_rejects() {
        let open = vec![position("A", 60, dec!(100))];
        let decision =
            validate_position_size(5, dec!(100), dec!(10000), &open, &RiskLimits::default()).unwrap();
        assert!(decision.is_rejected());
        assert!(!decision.approved);
    }

    #[test]
    fn position_count_cap_rejects_without_partial_fill() {
        let open: Vec<_> = (0..5).map(|i| position(&format!("S{i}"), 1, dec!(10))).collect();
        let decision =
            validate_position_size(5, dec!(100), dec!(10000), &open, &RiskLimits::default()).unwrap();
        assert_eq!(decision.adjusted_quantity, 0);
        assert!(decision.reason.contains("max 5"));
    }

    #[test]
    fn share_dearer_than_cap_is_rejected() {
        let decision =
            validate_position_size(1, dec!(5000), dec!(10000), &[], &RiskLimits::default()).unwrap();
        assert!(decision.is_rejected());
    }

    #[test]
    fn invalid_price_is_an_error() {
        assert!(matches!(
            validate_position_size(1, dec!(0), dec!(10000), &[], &RiskLimits::default()),
            Err(RiskError::InvalidEntryPrice(_))
        ));
    }
}
