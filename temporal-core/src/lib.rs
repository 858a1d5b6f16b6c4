//! Core types and utilities for the Temporal client.
//!
//! This crate provides the error taxonomy shared by the protocol, workflow
//! and worker crates.

pub mod error;

pub use error::*;
