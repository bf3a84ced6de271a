use chrono::{DateTime, NaiveDate, Utc};
use core_types::{AggregatedSignal, KillSwitchAction, StrategyKind, StrategySignal, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EventsError;

/// Where in the pipeline a symbol was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    Fetch,
    Strategy(StrategyKind),
    Risk,
}

/// A business-level occurrence inside the core.
///
/// Components emit these through an injected [`crate::EventSink`] instead of
/// logging directly, so the core stays free of I/O. The
/// `#[serde(tag = "type", content = "payload")]` layout serializes a `TradeClosed`
/// variant as `{ "type": "TradeClosed", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    /// A symbol's evaluation failed and was skipped; the batch carried on.
    SymbolSkipped {
        symbol: String,
        stage: SkipStage,
        reason: String,
    },
    SignalGenerated(StrategySignal),
    SignalAggregated(AggregatedSignal),
    /// The risk manager shrank a requested order.
    OrderAdjusted {
        symbol: String,
        requested: u64,
        adjusted: u64,
        reason: String,
    },
    /// The risk manager refused an order outright.
    OrderRejected {
        symbol: String,
        requested: u64,
        reason: String,
    },
    /// An approved order could not be filled (e.g. insufficient cash).
    OrderSkipped {
        date: NaiveDate,
        symbol: String,
        reason: String,
    },
    PositionOpened {
        date: NaiveDate,
        symbol: String,
        quantity: u64,
        price: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    },
    TrailingStopRaised {
        date: NaiveDate,
        symbol: String,
        from: Decimal,
        to: Decimal,
    },
    TradeClosed(Trade),
    KillSwitchTriggered {
        date: Option<NaiveDate>,
        action: KillSwitchAction,
        reason: String,
    },
    BacktestCancelled {
        date: NaiveDate,
    },
    BacktestCompleted {
        trading_days: usize,
        total_trades: usize,
        final_equity: Decimal,
    },
}

impl EngineEvent {
    /// The symbol this event concerns, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            EngineEvent::SymbolSkipped { symbol, .. }
            | EngineEvent::OrderAdjusted { symbol, .. }
            | EngineEvent::OrderRejected { symbol, .. }
            | EngineEvent::OrderSkipped { symbol, .. }
            | EngineEvent::PositionOpened { symbol, .. }
            | EngineEvent::TrailingStopRaised { symbol, .. } => Some(symbol),
            EngineEvent::SignalGenerated(signal) => Some(&signal.symbol),
            EngineEvent::SignalAggregated(signal) => Some(&signal.symbol),
            EngineEvent::TradeClosed(trade) => Some(&trade.symbol),
            EngineEvent::KillSwitchTriggered { .. }
            | EngineEvent::BacktestCancelled { .. }
            | EngineEvent::BacktestCompleted { .. } => None,
        }
    }
}

/// An event stamped with the wall-clock time it was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: EngineEvent,
}

impl EventEnvelope {
    pub fn now(event: EngineEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// One JSON object per event, for line-oriented consumers.
    pub fn to_json(&self) -> Result<String, EventsError> {
        serde_json::to_string(self).map_err(|e| EventsError::Serialization(e.to_string()))
    }
}
