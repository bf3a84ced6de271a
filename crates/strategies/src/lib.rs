//! # Vantage Strategy Library
//!
//! The three signal generators (momentum, mean reversion, breakout) behind one
//! [`SignalGenerator`] trait, a factory that builds them from configuration, and
//! a parallel batch evaluator.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Generators are pure functions of a bar history and an
//!   allocated capital. They hold only their validated parameters.
//! - **Isolation:** A failing symbol is reported and skipped, never fatal to a batch.
//! - **Explainability:** Every signal's `reason` names the indicators that fired
//!   and their values.

pub mod batch;
pub mod breakout;
pub mod error;
pub mod factory;
pub mod mean_reversion;
pub mod momentum;

// Re-export the key components to create a clean, public-facing API.
pub use batch::{evaluate_batch, SymbolBars};
pub use breakout::Breakout;
pub use error::StrategyError;
pub use factory::{create_enabled, create_generator};
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;

use core_types::{PriceBar, StrategyKind, StrategySignal};
use indicators::IndicatorError;
use rust_decimal::prelude::*;

/// The interface shared by all signal generators.
///
/// `Send + Sync` lets one generator evaluate many symbols on the rayon pool.
pub trait SignalGenerator: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Bars required before `evaluate` can say anything.
    fn min_bars(&self) -> usize;

    /// Evaluates the latest bar of `bars` for `symbol`.
    ///
    /// * `Ok(Some(signal))` - the entry conditions are met with enough confidence.
    /// * `Ok(None)` - no actionable signal.
    /// * `Err(StrategyError)` - the history cannot be evaluated (e.g. too short).
    fn evaluate(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        capital: Decimal,
    ) -> Result<Option<StrategySignal>, StrategyError>;
}

pub(crate) fn ensure_history(
    strategy: &'static str,
    required: usize,
    bars: &[PriceBar],
) -> Result<(), StrategyError> {
    if bars.len() < required {
        return Err(IndicatorError::InsufficientData {
            indicator: strategy,
            required,
            available: bars.len(),
        }
        .into());
    }
    Ok(())
}

/// Whole shares of `price` affordable with `fraction` of `capital`.
pub(crate) fn shares_for(capital: Decimal, fraction: Decimal, price: Decimal) -> u64 {
    if price <= Decimal::ZERO || capital <= Decimal::ZERO {
        return 0;
    }
    (capital * fraction / price).floor().to_u64().unwrap_or(0)
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
