use serde::{Deserialize, Serialize};
use std::fmt;

/// The side of an executed fill. The simulator only opens long positions, so a
/// trade's side is always the side of its entry leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side of the order
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// What a strategy (or the aggregator) recommends doing with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    /// Maps a directional action onto the order side that would express it.
    pub fn order_side(&self) -> Option<OrderSide> {
        match self {
            SignalAction::Buy => Some(OrderSide::Buy),
            SignalAction::Sell => Some(OrderSide::Sell),
            SignalAction::Hold => None,
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, SignalAction::Hold)
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "buy"),
            SignalAction::Sell => write!(f, "sell"),
            SignalAction::Hold => write!(f, "hold"),
        }
    }
}

/// Identifies one of the three signal generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Momentum,
    MeanReversion,
    Breakout,
}

impl StrategyKind {
    /// All generators in their canonical evaluation order.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Momentum,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
    ];
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Momentum => write!(f, "Momentum"),
            StrategyKind::MeanReversion => write!(f, "Mean-Reversion"),
            StrategyKind::Breakout => write!(f, "Breakout"),
        }
    }
}

/// Why a simulated position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    EndOfBacktest,
    /// Forced close after the max-drawdown kill switch fired.
    Liquidation,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExitReason::Signal => "signal",
            ExitReason::StopLoss => "stop-loss",
            ExitReason::TakeProfit => "take-profit",
            ExitReason::EndOfBacktest => "end-of-backtest",
            ExitReason::Liquidation => "liquidation",
        };
        write!(f, "{label}")
    }
}

/// What the caller must do after a kill-switch evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KillSwitchAction {
    Continue,
    /// Stop opening new positions for the rest of the trading day.
    Pause,
    /// Close every open position and stop trading.
    Liquidate,
}

impl fmt::Display for KillSwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillSwitchAction::Continue => write!(f, "continue"),
            KillSwitchAction::Pause => write!(f, "pause"),
            KillSwitchAction::Liquidate => write!(f, "liquidate"),
        }
    }
}
