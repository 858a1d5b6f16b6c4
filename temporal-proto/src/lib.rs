//! Protocol definitions for the Temporal client.
//!
//! This crate contains the shared data structures for workflow history,
//! decisions, and the workflow-service call surface.

pub mod shared;
pub mod workflow_service;

pub use shared::*;
pub use workflow_service::*;
