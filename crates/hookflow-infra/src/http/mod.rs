//! Outbound HTTP.
//!
//! - `transport` -- `reqwest` implementation of the engine's `HttpTransport` port

pub mod transport;
