//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks scoped to their owning user.
//! - List a user's tasks in deadline order.
//!
//! # Invariants
//! - Every query filters by `user_uuid`; users never see each other's tasks.
//! - Writes call `Task::validate()` before SQL mutations.
//! - Lists are sorted by `deadline ASC, created_at ASC, uuid ASC`.

use crate::model::task::{format_deadline, parse_deadline, Task, TaskId};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    title,
    deadline,
    completed,
    created_at
FROM tasks";

/// Persistence contract for tasks.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, user_id: UserId, task_id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, user_id: UserId) -> RepoResult<Vec<Task>>;
    /// Fails with `NotFound` when the task does not exist for `user_id`.
    fn set_completed(&self, user_id: UserId, task_id: TaskId, completed: bool) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (uuid, user_uuid, title, deadline, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.id.to_string(),
                task.user_id.to_string(),
                task.title.as_str(),
                format_deadline(task.deadline),
                bool_to_int(task.completed),
                task.created_at_ms,
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, user_id: UserId, task_id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE uuid = ?1 AND user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![task_id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_tasks(&self, user_id: UserId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_uuid = ?1
             ORDER BY deadline ASC, created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn set_completed(&self, user_id: UserId, task_id: TaskId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?1 WHERE uuid = ?2 AND user_uuid = ?3;",
            params![
                bool_to_int(completed),
                task_id.to_string(),
                user_id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task_id));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;

    let deadline_text: String = row.get("deadline")?;
    let deadline = parse_deadline(&deadline_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid deadline `{deadline_text}` in tasks.deadline"
        ))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        user_id: parse_uuid(&user_text, "tasks.user_uuid")?,
        title: row.get("title")?,
        deadline,
        completed,
        created_at_ms: row.get("created_at")?,
    };
    task.validate()?;
    Ok(task)
}
