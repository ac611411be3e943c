//! Workflow engine, business logic and repository trait definitions for Hookflow.
//!
//! This crate defines the "ports" (repository traits, HTTP transport) that
//! the infrastructure layer implements. It depends only on `hookflow-types`
//! -- never on `hookflow-infra` or any database/network crate.

pub mod repository;
pub mod service;
pub mod workflow;
