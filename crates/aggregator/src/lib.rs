//! # Vantage Signal Aggregator
//!
//! Merges the per-strategy signals of one evaluation cycle into a single
//! decision per symbol, weighting each generator's confidence.

use configuration::Aggregation;
use core_types::{AggregatedSignal, SignalAction, SignalReasoning, StrategySignal};
use events::{EngineEvent, EventSink};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod error;
pub mod weights;

pub use error::AggregatorError;
pub use weights::{detect_market_regime, MarketRegime, RegimeAssessment, StrategyWeights};

/// Combines signals per symbol.
///
/// For each symbol, `buy = Σ confidence × weight` over the buy signals and `sell`
/// likewise. The strictly larger side wins; a tie is `hold` with confidence 0.
/// A decision is only returned when its confidence is at least `min_confidence`.
///
/// The quantity is the largest quantity among the winning side's signals, never
/// their sum. Output is ordered by symbol.
pub fn aggregate(
    signals: &[StrategySignal],
    weights: &StrategyWeights,
    min_confidence: f64,
) -> Vec<AggregatedSignal> {
    let mut by_symbol: BTreeMap<&str, Vec<&StrategySignal>> = BTreeMap::new();
    for signal in signals {
        by_symbol.entry(signal.symbol.as_str()).or_default().push(signal);
    }

    by_symbol
        .into_iter()
        .filter_map(|(symbol, group)| {
            let decision = decide(symbol, &group, weights);
            (decision.confidence >= min_confidence).then_some(decision)
        })
        .collect()
}

fn weighted_sum(group: &[&StrategySignal], weights: &StrategyWeights, action: SignalAction) -> f64 {
    group
        .iter()
        .filter(|s| s.action == action)
        .map(|s| s.confidence * weights.weight_for(s.strategy))
        .sum()
}

fn decide(symbol: &str, group: &[&StrategySignal], weights: &StrategyWeights) -> AggregatedSignal {
    let buy_confidence = weighted_sum(group, weights, SignalAction::Buy);
    let sell_confidence = weighted_sum(group, weights, SignalAction::Sell);

    let (action, confidence) = if buy_confidence > sell_confidence {
        (SignalAction::Buy, buy_confidence)
    } else if sell_confidence > buy_confidence {
        (SignalAction::Sell, sell_confidence)
    } else {
        (SignalAction::Hold, 0.0)
    };

    let quantity = group
        .iter()
        .filter(|s| s.action == action && action.is_directional())
        .map(|s| s.quantity)
        .max()
        .unwrap_or(0);

    let mut final_decision = format!(
        "{action}: weighted buy confidence {buy_confidence:.3} vs sell {sell_confidence:.3}"
    );
    let buyers: Vec<String> = names(group, SignalAction::Buy);
    let sellers: Vec<String> = names(group, SignalAction::Sell);
    if !buyers.is_empty() && !sellers.is_empty() {
        final_decision.push_str(&format!(
            "; conflict: {} say buy, {} say sell",
            buyers.join(", "),
            sellers.join(", ")
        ));
    }

    AggregatedSignal {
        action,
        symbol: symbol.to_string(),
        quantity,
        confidence: confidence.min(1.0),
        reasoning: SignalReasoning {
            contributions: group.iter().map(|s| (*s).clone()).collect(),
            final_decision,
        },
    }
}

fn names(group: &[&StrategySignal], action: SignalAction) -> Vec<String> {
    group
        .iter()
        .filter(|s| s.action == action)
        .map(|s| s.strategy.to_string())
        .collect()
}

/// The aggregator as a component: validated weights plus event reporting.
pub struct SignalAggregator {
    weights: StrategyWeights,
    min_confidence: f64,
    sink: Arc<dyn EventSink>,
}

impl SignalAggregator {
    pub fn new(
        weights: StrategyWeights,
        min_confidence: f64,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, AggregatorError> {
        weights.validate()?;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(AggregatorError::InvalidMinConfidence(min_confidence));
        }
        Ok(Self {
            weights,
            min_confidence,
            sink,
        })
    }

    pub fn from_config(config: &Aggregation, sink: Arc<dyn EventSink>) -> Result<Self, AggregatorError> {
        Self::new(StrategyWeights::from(config), config.min_confidence, sink)
    }

    pub fn weights(&self) -> &StrategyWeights {
        &self.weights
    }

    /// Replaces the weights, e.g. with a regime recommendation.
    pub fn set_weights(&mut self, weights: StrategyWeights) -> Result<(), AggregatorError> {
        weights.validate()?;
        self.weights = weights;
        Ok(())
    }

    pub fn aggregate(&self, signals: &[StrategySignal]) -> Vec<AggregatedSignal> {
        let decisions = aggregate(signals, &self.weights, self.min_confidence);
        for decision in &decisions {
            self.sink.emit(EngineEvent::SignalAggregated(decision.clone()));
        }
        decisions
    }
}
