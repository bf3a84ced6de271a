//! # Vantage Risk Management
//!
//! Gates and sizes orders against portfolio limits, places ATR-based stops,
//! ratchets trailing stops and evaluates the kill switches.
//!
//! The checks are stateless functions of their inputs; the caller owns the
//! portfolio state. A rejected order is a normal [`PositionSizeDecision`], not an
//! error, and a tripped kill switch is a [`KillSwitchDecision`] the caller must
//! act on.

pub mod error;
pub mod kill_switch;
pub mod manager;
pub mod position_size;
pub mod sizing;
pub mod stops;

pub use configuration::{RiskLimits, SizingSettings};
pub use core_types::KillSwitchAction;
pub use error::RiskError;
pub use kill_switch::{check_kill_switches, KillSwitchDecision};
pub use manager::{review_buy, LimitRiskManager, ReviewedOrder, RiskManager};
pub use position_size::{validate_position_size, PositionSizeDecision};
pub use sizing::{
    confidence_scaled_size, determine_optimal_position_size, fixed_percent_size,
    inverse_volatility_size, kelly_size, median_shares, SizingInputs, SizingRecommendation,
};
pub use stops::{atr_for_stops, calculate_stops, update_trailing_stop, Stops};
