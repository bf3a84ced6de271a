use crate::messages::{EngineEvent, EventEnvelope};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// The structured event interface injected into every component.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards each event to `tracing` with structured fields. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: EngineEvent) {
        match &event {
            EngineEvent::SymbolSkipped { symbol, stage, reason } => {
                tracing::warn!(%symbol, ?stage, %reason, "symbol skipped");
            }
            EngineEvent::SignalGenerated(signal) => {
                tracing::debug!(
                    strategy = %signal.strategy,
                    symbol = %signal.symbol,
                    action = %signal.action,
                    quantity = signal.quantity,
                    confidence = signal.confidence,
                    reason = %signal.reason,
                    "strategy signal"
                );
            }
            EngineEvent::SignalAggregated(signal) => {
                tracing::info!(
                    symbol = %signal.symbol,
                    action = %signal.action,
                    quantity = signal.quantity,
                    confidence = signal.confidence,
                    "aggregated signal"
                );
            }
            EngineEvent::OrderAdjusted { symbol, requested, adjusted, reason } => {
                tracing::info!(%symbol, requested, adjusted, %reason, "order size adjusted");
            }
            EngineEvent::OrderRejected { symbol, requested, reason } => {
                tracing::info!(%symbol, requested, %reason, "order rejected by risk manager");
            }
            EngineEvent::OrderSkipped { date, symbol, reason } => {
                tracing::warn!(%date, %symbol, %reason, "order skipped");
            }
            EngineEvent::PositionOpened { date, symbol, quantity, price, stop_loss, take_profit } => {
                tracing::info!(
                    %date, %symbol, quantity, %price,
                    stop_loss = ?stop_loss,
                    take_profit = ?take_profit,
                    "position opened"
                );
            }
            EngineEvent::TrailingStopRaised { date, symbol, from, to } => {
                tracing::debug!(%date, %symbol, %from, %to, "trailing stop raised");
            }
            EngineEvent::TradeClosed(trade) => {
                tracing::info!(
                    symbol = %trade.symbol,
                    exit_date = %trade.exit_date,
                    pnl = %trade.pnl,
                    exit_reason = %trade.exit_reason,
                    "trade closed"
                );
            }
            EngineEvent::KillSwitchTriggered { date, action, reason } => {
                tracing::warn!(date = ?date, %action, %reason, "kill switch triggered");
            }
            EngineEvent::BacktestCancelled { date } => {
                tracing::warn!(%date, "backtest cancelled");
            }
            EngineEvent::BacktestCompleted { trading_days, total_trades, final_equity } => {
                tracing::info!(trading_days, total_trades, %final_equity, "backtest completed");
            }
        }
    }
}

/// Publishes every event on a broadcast channel, e.g. for a UI collaborator.
///
/// Sending with no subscribers is not an error; the event is simply dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<EventEnvelope>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.sender.send(EventEnvelope::now(event));
    }
}

/// Records events in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EngineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, predicate: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| predicate(e))
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}
