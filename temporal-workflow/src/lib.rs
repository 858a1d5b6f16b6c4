//! Decision engine for the Temporal client.
//!
//! This crate implements the client-side decision/event correlation engine:
//! deterministic decision identifiers, per-command state machines, the
//! orchestrator that renders the outgoing decision batch, and the
//! replayed-history accessor it consumes.

pub mod decisions;
pub mod history;
pub mod markers;
pub mod state_machine;

pub use decisions::*;
pub use history::*;
pub use markers::*;
pub use state_machine::*;
