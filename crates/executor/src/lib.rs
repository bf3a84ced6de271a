//! # Vantage Executor Crate
//!
//! Simulated order execution and the simulator's account book.
//!
//! - **State vs. Logic Decoupling:** an [`Executor`] only prices an order leg,
//!   producing a [`Fill`] with its commission and slippage. The [`Portfolio`] is the
//!   state machine that applies fills to cash and positions and emits completed
//!   [`core_types::Trade`]s.
//! - Cash is the single mutable resource of a simulation; all fills for a day
//!   are applied to it sequentially.

pub mod error;
pub mod exchange;
pub mod portfolio;

pub use error::ExecutorError;
pub use exchange::{Executor, Fill, SimulatedExecutor};
pub use portfolio::{Portfolio, SimulatedPosition};
