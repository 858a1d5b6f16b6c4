//! Decision task processing for the Temporal client.
//!
//! This crate routes replayed history events into the decision engine and
//! assembles decision-task completions from the engine's output.

pub mod replay;
pub mod task;

pub use replay::*;
pub use task::*;
