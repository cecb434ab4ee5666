//! Core domain logic for nertodo.
//! Accounts, tasks, and NER-assisted deadline resolution.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ner;
pub mod repo;
pub mod resolve;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{Entity, EntityType, NerResponse, NerStatus};
pub use model::task::{format_deadline, parse_deadline, Task, TaskDraft, TaskId};
pub use model::user::{SessionToken, User, UserCredentials, UserId};
pub use ner::{HttpNerClient, NerClient, NerError, NerResult};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use resolve::clock::{Clock, FixedClock, SystemClock};
pub use resolve::deadline::{resolve_deadline, resolve_with_clock, ResolvedTask};
pub use service::account_service::{AccountError, AccountResult, AccountService};
pub use service::task_service::{
    SuggestOutcome, SuggestStatus, TaskService, TaskServiceError, TaskServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
