//! Infrastructure layer for Hookflow.
//!
//! Contains implementations of the ports defined in `hookflow-core`:
//! SQLite storage for workflows and runs, the `reqwest` HTTP transport used by
//! `http_request` steps, and the `hookflow.toml` configuration loader.

pub mod config;
pub mod http;
pub mod sqlite;
