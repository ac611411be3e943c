//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, definition validation and the
//! workflow engine. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod run;
pub mod trigger;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
