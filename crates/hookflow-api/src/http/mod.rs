//! HTTP/REST API layer for Hookflow.
//!
//! Axum-based management API at `/api/`, envelope response format, CORS
//! support, and the `/t/*` trigger endpoint that starts workflow runs.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
