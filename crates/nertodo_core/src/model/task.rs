//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted to-do record owned by one user.
//! - Validate title and deadline before persistence.
//!
//! # Invariants
//! - `title` is trimmed, non-empty and at most [`MAX_TITLE_CHARS`] chars.
//! - `deadline` is a calendar date rendered as `YYYY-MM-DD`.
//! - `completed` starts as `false`.

use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Wire and storage format of task deadlines.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";
/// Upper bound for task titles, counted in chars.
pub const MAX_TITLE_CHARS: usize = 512;

/// Stable identifier of a task.
pub type TaskId = Uuid;

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    TitleTooLong { chars: usize },
    UntrimmedTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "task title has {chars} chars; maximum is {MAX_TITLE_CHARS}"
            ),
            Self::UntrimmedTitle => write!(f, "task title has leading or trailing whitespace"),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub deadline: NaiveDate,
    pub completed: bool,
    /// Unix epoch milliseconds, assigned by the caller at creation.
    pub created_at_ms: i64,
}

impl Task {
    /// Creates an open task with a generated ID.
    ///
    /// The title is trimmed; validation still runs on persistence.
    pub fn new(
        user_id: UserId,
        title: impl AsRef<str>,
        deadline: NaiveDate,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.as_ref().trim().to_string(),
            deadline,
            completed: false,
            created_at_ms,
        }
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.title.trim() != self.title {
            return Err(TaskValidationError::UntrimmedTitle);
        }
        let chars = self.title.chars().count();
        if chars > MAX_TITLE_CHARS {
            return Err(TaskValidationError::TitleTooLong { chars });
        }
        Ok(())
    }

    /// Returns the deadline in `YYYY-MM-DD` form.
    pub fn deadline_string(&self) -> String {
        format_deadline(self.deadline)
    }
}

/// Formats a calendar date the way deadlines are stored and displayed.
pub fn format_deadline(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` deadline string.
pub fn parse_deadline(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DEADLINE_FORMAT).ok()
}

/// Editable title/deadline pair pre-filled before a task is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub deadline: NaiveDate,
}

impl TaskDraft {
    /// Empty title with the deadline defaulting to `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            deadline: today,
        }
    }

    /// Whether the draft carries a title a task can be created from.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_deadline, parse_deadline, Task, TaskDraft, TaskValidationError, MAX_TITLE_CHARS,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_trims_title_and_starts_open() {
        let task = Task::new(Uuid::new_v4(), "  ship it  ", date(2024, 5, 1), 0);
        assert_eq!(task.title, "ship it");
        assert!(!task.completed);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_and_oversized_titles() {
        let blank = Task::new(Uuid::new_v4(), "   ", date(2024, 5, 1), 0);
        assert_eq!(blank.validate(), Err(TaskValidationError::EmptyTitle));

        let long = Task::new(
            Uuid::new_v4(),
            "x".repeat(MAX_TITLE_CHARS + 1),
            date(2024, 5, 1),
            0,
        );
        assert!(matches!(
            long.validate(),
            Err(TaskValidationError::TitleTooLong { .. })
        ));

        let mut untrimmed = Task::new(Uuid::new_v4(), "ok", date(2024, 5, 1), 0);
        untrimmed.title = " ok".to_string();
        assert_eq!(untrimmed.validate(), Err(TaskValidationError::UntrimmedTitle));
    }

    #[test]
    fn only_drafts_with_visible_title_are_creatable() {
        let mut draft = TaskDraft::blank(date(2024, 5, 1));
        assert!(!draft.has_title());
        draft.title = " \t".to_string();
        assert!(!draft.has_title());
        draft.title = "call mom".to_string();
        assert!(draft.has_title());
    }

    #[test]
    fn deadline_format_roundtrips_with_zero_padding() {
        assert_eq!(format_deadline(date(2024, 3, 7)), "2024-03-07");
        assert_eq!(parse_deadline(" 2024-03-07 "), Some(date(2024, 3, 7)));
        assert_eq!(parse_deadline("03/07/2024"), None);
        assert_eq!(parse_deadline("2024-02-30"), None);
    }
}
