//! # Vantage Events
//!
//! The structured event language of the core. Strategy generators, the risk
//! manager, the simulator and the live engine report what they did by emitting
//! [`EngineEvent`]s through an injected [`EventSink`]; the caller decides whether
//! those end up in the log, on a broadcast channel, or in a test's memory buffer.
//!
//! As a Layer 0 crate, it depends only on `core-types`.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;
pub mod sink;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{EngineEvent, EventEnvelope, SkipStage};
pub use sink::{BroadcastSink, EventSink, MemorySink, NullSink, TracingSink};

use std::sync::Arc;

/// Convenience for components that default to logging through `tracing`.
pub fn default_sink() -> Arc<dyn EventSink> {
    Arc::new(TracingSink)
}
