//! # Vantage Backtester
//!
//! Replays the indicator, signal, aggregation and risk pipeline over historical
//! bars one trading day at a time and reports the outcome.
//!
//! Days run strictly in order because each day's cash, positions, stops and
//! high-water mark depend on the one before. Within a day, all fills are applied
//! sequentially against the single cash balance.
//!
//! The strategy is injected as a [`SignalSource`]: either the standard
//! [`PipelineSignalSource`] or any closure wrapped with [`signal_fn`].

pub mod cancel;
pub mod error;
pub mod history;
pub mod result;
pub mod simulator;
pub mod source;

pub use cancel::CancelHandle;
pub use error::BacktestError;
pub use history::{load_history, trading_days, HistoricalData};
pub use result::{BacktestResult, KillSwitchEvent};
pub use simulator::Backtester;
pub use source::{signal_fn, FnSignalSource, PipelineSignalSource, SignalSource};
