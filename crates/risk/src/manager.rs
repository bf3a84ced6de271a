use crate::error::RiskError;
use crate::kill_switch::{check_kill_switches, KillSwitchDecision};
use crate::position_size::{validate_position_size, PositionSizeDecision};
use crate::sizing::{determine_optimal_position_size, SizingInputs, SizingRecommendation};
use crate::stops::{calculate_stops, update_trailing_stop, Stops};
use configuration::{RiskLimits, SizingSettings};
use core_types::{PortfolioStatus, Position};
use events::{EngineEvent, EventSink};
use rust_decimal::Decimal;

/// The risk interface consumed by the backtester and the live engine.
///
/// The `Send + Sync` bounds let one manager be shared across evaluation threads.
pub trait RiskManager: Send + Sync {
    fn limits(&self) -> &RiskLimits;

    fn validate_position_size(
        &self,
        quantity: u64,
        price: Decimal,
        capital: Decimal,
        open_positions: &[Position],
    ) -> Result<PositionSizeDecision, RiskError>;

    fn calculate_stops(&self, entry_price: Decimal, atr: Decimal) -> Result<Stops, RiskError>;

    fn update_trailing_stop(
        &self,
        current_price: Decimal,
        highest_price_since_entry: Decimal,
        current_stop: Decimal,
    ) -> Decimal;

    fn check_kill_switches(&self, status: &PortfolioStatus) -> KillSwitchDecision;

    fn recommend_size(&self, inputs: &SizingInputs) -> SizingRecommendation;
}

/// The standard implementation: fixed limits from configuration.
#[derive(Debug, Clone)]
pub struct LimitRiskManager {
    limits: RiskLimits,
    sizing: SizingSettings,
}

impl LimitRiskManager {
    /// Creates a manager, validating that the limits are logical.
    pub fn new(limits: RiskLimits, sizing: SizingSettings) -> Result<Self, RiskError> {
        limits
            .validate()
            .map_err(|e| RiskError::InvalidParameters(e.to_string()))?;
        sizing
            .validate()
            .map_err(|e| RiskError::InvalidParameters(e.to_string()))?;
        Ok(Self { limits, sizing })
    }
}

impl RiskManager for LimitRiskManager {
    fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    fn validate_position_size(
        &self,
        quantity: u64,
        price: Decimal,
        capital: Decimal,
        open_positions: &[Position],
    ) -> Result<PositionSizeDecision, RiskError> {
        validate_position_size(quantity, price, capital, open_positions, &self.limits)
    }

    fn calculate_stops(&self, entry_price: Decimal, atr: Decimal) -> Result<Stops, RiskError> {
        calculate_stops(entry_price, atr, &self.limits)
    }

    fn update_trailing_stop(
        &self,
        current_price: Decimal,
        highest_price_since_entry: Decimal,
        current_stop: Decimal,
    ) -> Decimal {
        update_trailing_stop(current_price, highest_price_since_entry, current_stop, &self.limits)
    }

    fn check_kill_switches(&self, status: &PortfolioStatus) -> KillSwitchDecision {
        check_kill_switches(status, &self.limits)
    }

    fn recommend_size(&self, inputs: &SizingInputs) -> SizingRecommendation {
        determine_optimal_position_size(inputs, &self.sizing)
    }
}

/// An order that survived risk review, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewedOrder {
    pub symbol: String,
    pub quantity: u64,
    pub price: Decimal,
    pub stops: Option<Stops>,
    pub decision: PositionSizeDecision,
}

/// Sizes a buy through `manager` and attaches stops when an ATR is available.
///
/// Returns `Ok(None)` for a rejection. Adjustments and rejections are reported
/// through `sink`. A degenerate ATR leaves the order without stops rather than
/// blocking it.
#[allow(clippy::too_many_arguments)]
pub fn review_buy(
    manager: &dyn RiskManager,
    sink: &dyn EventSink,
    symbol: &str,
    requested: u64,
    price: Decimal,
    capital: Decimal,
    open_positions: &[Position],
    atr: Option<Decimal>,
) -> Result<Option<ReviewedOrder>, RiskError> {
    let decision = manager.validate_position_size(requested, price, capital, open_positions)?;
    if decision.is_rejected() {
        sink.emit(EngineEvent::OrderRejected {
            symbol: symbol.to_string(),
            requested,
            reason: decision.reason.clone(),
        });
        return Ok(None);
    }
    if !decision.approved {
        sink.emit(EngineEvent::OrderAdjusted {
            symbol: symbol.to_string(),
            requested,
            adjusted: decision.adjusted_quantity,
            reason: decision.reason.clone(),
        });
    }

    let stops = match atr.map(|atr| manager.calculate_stops(price, atr)) {
        Some(Ok(stops)) => Some(stops),
        Some(Err(RiskError::DegenerateAtr { .. })) => {
            tracing::warn!(%symbol, %price, "zero ATR; opening without protective stops");
            None
        }
        Some(Err(e)) => return Err(e),
        None => None,
    };

    Ok(Some(ReviewedOrder {
        symbol: symbol.to_string(),
        quantity: decision.adjusted_quantity,
        price,
        stops,
        decision,
    }))
}
