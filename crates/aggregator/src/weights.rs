use crate::error::AggregatorError;
use configuration::Aggregation;
use core_types::StrategyKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much each generator's confidence counts towards the combined decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub momentum: f64,
    pub mean_reversion: f64,
    pub breakout: f64,
}

impl StrategyWeights {
    pub const BALANCED: StrategyWeights = StrategyWeights {
        momentum: 1.0 / 3.0,
        mean_reversion: 1.0 / 3.0,
        breakout: 1.0 / 3.0,
    };

    pub fn weight_for(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Momentum => self.momentum,
            StrategyKind::MeanReversion => self.mean_reversion,
            StrategyKind::Breakout => self.breakout,
        }
    }

    pub fn validate(&self) -> Result<(), AggregatorError> {
        for kind in StrategyKind::ALL {
            let w = self.weight_for(kind);
            if !(0.0..=1.0).contains(&w) {
                return Err(AggregatorError::InvalidWeights(format!(
                    "{kind} weight {w} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self::BALANCED
    }
}

impl From<&Aggregation> for StrategyWeights {
    fn from(config: &Aggregation) -> Self {
        Self {
            momentum: config.momentum_weight,
            mean_reversion: config.mean_reversion_weight,
            breakout: config.breakout_weight,
        }
    }
}

/// The market state recognised by [`detect_market_regime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    HighVolatility,
    StrongTrend,
    RangeBound,
    Balanced,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketRegime::HighVolatility => "high volatility",
            MarketRegime::StrongTrend => "strong trend",
            MarketRegime::RangeBound => "range-bound",
            MarketRegime::Balanced => "balanced",
        };
        write!(f, "{label}")
    }
}

/// Volatility index above which the market counts as highly volatile.
pub const HIGH_VOLATILITY_THRESHOLD: f64 = 25.0;
/// Trend strength (ADX scale) above which the market is trending.
pub const STRONG_TREND_THRESHOLD: f64 = 25.0;
/// Trend strength below which the market is range-bound.
pub const RANGE_BOUND_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: MarketRegime,
    pub weights: StrategyWeights,
}

/// Recommends a weight set from a fixed lookup table.
///
/// Checked in order: high volatility favours mean reversion, a strong trend
/// favours momentum, a range-bound market favours mean reversion, and anything
/// else gets balanced weights.
pub fn detect_market_regime(volatility_index: f64, trend_strength: f64) -> RegimeAssessment {
    let regime = if volatility_index > HIGH_VOLATILITY_THRESHOLD {
        MarketRegime::HighVolatility
    } else if trend_strength > STRONG_TREND_THRESHOLD {
        MarketRegime::StrongTrend
    } else if trend_strength < RANGE_BOUND_THRESHOLD {
        MarketRegime::RangeBound
    } else {
        MarketRegime::Balanced
    };

    let weights = match regime {
        MarketRegime::HighVolatility => StrategyWeights {
            momentum: 0.2,
            mean_reversion: 0.5,
            breakout: 0.3,
        },
        MarketRegime::StrongTrend => StrategyWeights {
            momentum: 0.5,
            mean_reversion: 0.2,
            breakout: 0.3,
        },
        MarketRegime::RangeBound => StrategyWeights {
            momentum: 0.2,
            mean_reversion: 0.6,
            breakout: 0.2,
        },
        MarketRegime::Balanced => StrategyWeights::BALANCED,
    };

    RegimeAssessment { regime, weights }
}
