//! # Vantage Core Types
//!
//! The shared vocabulary of the workspace. Every other crate speaks in terms of
//! these structs: price bars flow in from the market-data collaborator, strategy
//! signals flow out of the generators, and trades flow out of the simulator.
//!
//! This is a Layer 0 crate. It has no knowledge of indicators, risk or execution.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ExitReason, KillSwitchAction, OrderSide, SignalAction, StrategyKind};
pub use error::CoreError;
pub use structs::{
    AggregatedSignal, PortfolioStatus, Position, PriceBar, SignalReasoning, StrategySignal, Trade,
};
