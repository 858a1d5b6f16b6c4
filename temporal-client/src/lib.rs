//! Workflow service client wrapper for the Temporal client.
//!
//! This crate wraps a `WorkflowService` transport with the cross-cutting
//! client policies: per-call-category deadlines, client-identity headers,
//! and the shutdown/termination protocol.

pub mod options;
pub mod stubs;

pub use options::*;
pub use stubs::*;
