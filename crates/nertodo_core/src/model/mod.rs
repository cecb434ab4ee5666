//! Domain model for users, tasks and NER entities.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep wire shapes (NER entities) separate from persisted records.
//!
//! # Invariants
//! - Every persisted object is identified by a stable UUID.
//! - Deadlines are calendar dates without a time-of-day component.

pub mod entity;
pub mod task;
pub mod user;
