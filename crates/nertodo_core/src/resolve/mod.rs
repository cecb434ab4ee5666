//! Relative-date resolution for NER output.
//!
//! # Responsibility
//! - Turn extracted entities into a task title and concrete deadline.
//! - Abstract wall-clock access behind [`Clock`].
//!
//! # Invariants
//! - Resolution is pure for a fixed `(entities, today)` pair.
//! - Resolution never fails; degenerate input degrades to defaults.

pub mod clock;
pub mod deadline;
