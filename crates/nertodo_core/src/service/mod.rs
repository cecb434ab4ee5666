//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, clock and NER calls into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod account_service;
pub mod task_service;
