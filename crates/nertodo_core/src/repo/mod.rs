//! Repository layer: data access contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented persistence traits.
//! - Keep SQL details out of services.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Unique-constraint hits surface as `RepoError::Conflict`, not raw SQLite errors.
//! - Read paths reject invalid persisted data instead of masking it.

use crate::db::DbError;
use crate::model::task::TaskValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by user, session and task storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(Uuid),
    /// A unique column already holds the value; carries the column name.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Conflict(column) => write!(f, "duplicate value for `{column}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &value {
            if failure.code == ErrorCode::ConstraintViolation
                && message.starts_with("UNIQUE constraint failed")
            {
                let column = message
                    .rsplit(['.', ' '])
                    .next()
                    .unwrap_or_default()
                    .to_string();
                return Self::Conflict(column);
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
