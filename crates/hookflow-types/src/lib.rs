//! Shared domain types for Hookflow.
//!
//! This crate contains the types shared across the Hookflow workspace:
//! workflow definitions and steps, run outcomes and records, global
//! configuration, and repository error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod workflow;
