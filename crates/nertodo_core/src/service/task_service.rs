//! Task use-case service.
//!
//! # Responsibility
//! - Create, list and complete tasks for one signed-in user.
//! - Pre-fill a task draft from a free-form sentence through NER.
//!
//! # Invariants
//! - Deadlines entering through the service are `YYYY-MM-DD` strings.
//! - A suggestion only replaces the draft when the NER response passes the
//!   two-entity gate and resolution yields a deadline.
//! - A blank resolved title never overwrites the prior title.
//! - Sentence and title text are never logged.

use crate::model::task::{parse_deadline, Task, TaskDraft, TaskId, TaskValidationError};
use crate::model::user::UserId;
use crate::ner::{NerClient, NerError};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::resolve::clock::Clock;
use crate::resolve::deadline::resolve_deadline;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    InvalidDeadline(String),
    Validation(TaskValidationError),
    TaskNotFound(TaskId),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDeadline(value) => {
                write!(f, "invalid deadline `{value}`; expected YYYY-MM-DD")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(task_id) => write!(f, "task not found: {task_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(task_id) => Self::TaskNotFound(task_id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// How a suggestion attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestStatus {
    /// Draft took the resolved deadline, and the resolved title when non-blank.
    Applied,
    /// Sentence was blank; NER was not called.
    BlankInput,
    /// NER answered but the response failed the two-entity gate.
    Gated { success: bool, entities: usize },
    /// Gate passed but no `RELATIVE DAY` entity was present.
    Unresolved,
    /// NER call failed.
    Failed(NerError),
}

/// Draft after a suggestion attempt plus the reason it looks that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestOutcome {
    pub draft: TaskDraft,
    pub status: SuggestStatus,
}

impl SuggestOutcome {
    pub fn applied(&self) -> bool {
        self.status == SuggestStatus::Applied
    }
}

/// Task service facade over a task repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates an open task for `user_id`.
    pub fn create_task(
        &self,
        user_id: UserId,
        title: &str,
        deadline: &str,
    ) -> TaskServiceResult<Task> {
        let deadline = parse_deadline(deadline)
            .ok_or_else(|| TaskServiceError::InvalidDeadline(deadline.to_string()))?;
        let task = Task::new(user_id, title, deadline, self.clock.now_epoch_ms());
        self.repo.create_task(&task)?;
        info!(
            "event=task_create module=task status=ok user_id={user_id} task_id={} deadline={}",
            task.id,
            task.deadline_string()
        );
        Ok(task)
    }

    /// Lists the user's tasks in deadline order.
    pub fn list_tasks(&self, user_id: UserId) -> TaskServiceResult<Vec<Task>> {
        Ok(self.repo.list_tasks(user_id)?)
    }

    /// Marks a task done or open again and returns the stored record.
    pub fn set_completed(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> TaskServiceResult<Task> {
        self.repo.set_completed(user_id, task_id, completed)?;
        info!(
            "event=task_complete module=task status=ok user_id={user_id} task_id={task_id} completed={completed}"
        );
        self.repo
            .get_task(user_id, task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    /// Empty title, deadline today.
    pub fn default_draft(&self) -> TaskDraft {
        TaskDraft::blank(self.clock.today())
    }

    /// Asks NER to fill `prior` from a free-form sentence.
    ///
    /// # Contract
    /// - Blank sentence: NER is not called.
    /// - NER failure, gate miss or unresolved entities: `prior` is returned.
    /// - Otherwise the resolved deadline replaces `prior`'s, and the resolved
    ///   title replaces `prior`'s unless it is blank.
    pub fn suggest_task(
        &self,
        ner: &dyn NerClient,
        sentence: &str,
        prior: TaskDraft,
    ) -> SuggestOutcome {
        if sentence.trim().is_empty() {
            return SuggestOutcome {
                draft: prior,
                status: SuggestStatus::BlankInput,
            };
        }

        let response = match ner.extract(sentence) {
            Ok(response) => response,
            Err(err) => {
                warn!("event=task_suggest module=task status=error error={err}");
                return SuggestOutcome {
                    draft: prior,
                    status: SuggestStatus::Failed(err),
                };
            }
        };

        let Some(entities) = response.resolvable_entities() else {
            info!(
                "event=task_suggest module=task status=gated success={} entities={}",
                response.success,
                response.data.len()
            );
            return SuggestOutcome {
                draft: prior,
                status: SuggestStatus::Gated {
                    success: response.success,
                    entities: response.data.len(),
                },
            };
        };

        match resolve_deadline(entities, self.clock.today()) {
            Some(resolved) => {
                let kept_title = resolved.title.trim().is_empty();
                info!(
                    "event=task_suggest module=task status=ok deadline={} kept_title={kept_title}",
                    resolved.deadline_string()
                );
                let mut draft = resolved.into_draft();
                if kept_title {
                    draft.title = prior.title;
                }
                SuggestOutcome {
                    draft,
                    status: SuggestStatus::Applied,
                }
            }
            None => {
                info!("event=task_suggest module=task status=unresolved");
                SuggestOutcome {
                    draft: prior,
                    status: SuggestStatus::Unresolved,
                }
            }
        }
    }
}
