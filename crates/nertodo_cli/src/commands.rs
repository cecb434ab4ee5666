//! Subcommand handlers.
//!
//! Each handler opens its own connection, runs one use case, and prints
//! either a short human line or JSON when `--json` is set.

use chrono::NaiveDate;
use nertodo_core::db::open_db;
use nertodo_core::{
    format_deadline, parse_deadline, resolve_deadline, AccountService, AppConfig, Clock,
    FixedClock, HttpNerClient, NerResponse, SessionToken, SqliteTaskRepository,
    SqliteUserRepository, SuggestStatus, SystemClock, Task, TaskDraft, TaskService, UserId,
};
use rusqlite::Connection;
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use uuid::Uuid;

pub struct Context {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    session: Option<SessionToken>,
    json: bool,
}

impl Context {
    pub fn new(
        config: AppConfig,
        today: Option<NaiveDate>,
        session: Option<&str>,
        json: bool,
    ) -> Self {
        let clock: Arc<dyn Clock> = match today {
            Some(date) => Arc::new(FixedClock::at_date(date)),
            None => Arc::new(SystemClock),
        };
        Self {
            config,
            clock,
            session: session.map(SessionToken::from_client),
            json,
        }
    }

    fn open(&self) -> Result<Connection, String> {
        open_db(&self.config.db_path).map_err(|err| {
            format!(
                "cannot open database `{}`: {err}",
                self.config.db_path.display()
            )
        })
    }

    fn accounts<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> AccountService<SqliteUserRepository<'conn>> {
        AccountService::new(
            SqliteUserRepository::new(conn),
            self.clock.clone(),
            self.config.session_ttl,
        )
    }

    fn tasks<'conn>(&self, conn: &'conn Connection) -> TaskService<SqliteTaskRepository<'conn>> {
        TaskService::new(SqliteTaskRepository::new(conn), self.clock.clone())
    }

    fn ner(&self) -> HttpNerClient {
        HttpNerClient::new(self.config.ner_base_url.clone(), self.config.ner_timeout)
    }

    fn require_user(&self, conn: &Connection) -> Result<UserId, String> {
        let token = self
            .session
            .as_ref()
            .ok_or("not signed in; pass --session or set NERTODO_SESSION")?;
        self.accounts(conn)
            .require_user_id(token)
            .map_err(|err| err.to_string())
    }

    fn emit(&self, value: serde_json::Value, human: impl FnOnce() -> String) {
        if self.json {
            println!("{value}");
        } else {
            println!("{}", human());
        }
    }
}

pub fn sign_up(ctx: &Context, email: &str, username: &str, password: &str) -> Result<(), String> {
    let conn = ctx.open()?;
    let user = ctx
        .accounts(&conn)
        .sign_up(email, username, password)
        .map_err(|err| err.to_string())?
        .ok_or("username or email already exists")?;
    ctx.emit(json!({ "user": user }), || {
        format!("created user {} ({})", user.username, user.id)
    });
    Ok(())
}

pub fn sign_in(ctx: &Context, username: &str, password: &str) -> Result<(), String> {
    let conn = ctx.open()?;
    let accounts = ctx.accounts(&conn);
    let user = accounts
        .authenticate(username, password)
        .map_err(|err| err.to_string())?
        .ok_or("invalid username or password")?;
    let token = accounts
        .create_session(user.id)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "user": user, "session": token }), || {
        token.to_string()
    });
    Ok(())
}

pub fn sign_out(ctx: &Context) -> Result<(), String> {
    let Some(token) = ctx.session.as_ref() else {
        return Err("no session to sign out".to_string());
    };
    let conn = ctx.open()?;
    let removed = ctx
        .accounts(&conn)
        .sign_out(token)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "signed_out": removed }), || "signed out".to_string());
    Ok(())
}

pub fn who_am_i(ctx: &Context) -> Result<(), String> {
    let token = ctx
        .session
        .as_ref()
        .ok_or("not signed in; pass --session or set NERTODO_SESSION")?;
    let conn = ctx.open()?;
    let user = ctx
        .accounts(&conn)
        .current_user(token)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "user": user }), || {
        format!("Welcome, {}! <{}>", user.username, user.email)
    });
    Ok(())
}

pub fn add_task(ctx: &Context, title: &str, deadline: Option<&str>) -> Result<(), String> {
    let conn = ctx.open()?;
    let user_id = ctx.require_user(&conn)?;
    let deadline = deadline
        .map(str::to_string)
        .unwrap_or_else(|| format_deadline(ctx.clock.today()));
    let task = ctx
        .tasks(&conn)
        .create_task(user_id, title, &deadline)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "message": "Task created successfully", "task": task }), || {
        format!("added {}", render_task(&task))
    });
    Ok(())
}

pub fn list_tasks(ctx: &Context) -> Result<(), String> {
    let conn = ctx.open()?;
    let user_id = ctx.require_user(&conn)?;
    let tasks = ctx
        .tasks(&conn)
        .list_tasks(user_id)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "tasks": tasks }), || {
        if tasks.is_empty() {
            "You don't have any task, add new tasks to get started".to_string()
        } else {
            tasks.iter().map(render_task).collect::<Vec<_>>().join("\n")
        }
    });
    Ok(())
}

pub fn set_completed(ctx: &Context, task_id: &str, completed: bool) -> Result<(), String> {
    let task_id =
        Uuid::parse_str(task_id.trim()).map_err(|_| format!("invalid task id `{task_id}`"))?;
    let conn = ctx.open()?;
    let user_id = ctx.require_user(&conn)?;
    let task = ctx
        .tasks(&conn)
        .set_completed(user_id, task_id, completed)
        .map_err(|err| err.to_string())?;
    ctx.emit(json!({ "task": task }), || render_task(&task));
    Ok(())
}

pub fn suggest(
    ctx: &Context,
    sentence: &str,
    title: &str,
    deadline: Option<&str>,
    create: bool,
) -> Result<(), String> {
    let conn = ctx.open()?;
    let user_id = if create {
        Some(ctx.require_user(&conn)?)
    } else {
        None
    };
    let tasks = ctx.tasks(&conn);

    let mut prior = tasks.default_draft();
    prior.title = title.to_string();
    if let Some(value) = deadline {
        prior.deadline =
            parse_deadline(value).ok_or_else(|| format!("invalid --deadline `{value}`"))?;
    }

    let outcome = tasks.suggest_task(&ctx.ner(), sentence, prior);
    let untitled = create && outcome.applied() && !outcome.draft.has_title();
    let created = match (user_id, outcome.applied() && !untitled) {
        (Some(user_id), true) => Some(
            tasks
                .create_task(
                    user_id,
                    &outcome.draft.title,
                    &format_deadline(outcome.draft.deadline),
                )
                .map_err(|err| err.to_string())?,
        ),
        _ => None,
    };

    let status = describe_status(&outcome.status);
    ctx.emit(
        json!({
            "draft": outcome.draft,
            "status": status,
            "task": created,
            "skipped": untitled.then_some("no title; pass --title"),
        }),
        || {
            let mut line = format!("{status}: {}", render_draft(&outcome.draft));
            if let Some(task) = &created {
                line.push_str(&format!("\nadded {}", render_task(task)));
            } else if untitled {
                line.push_str("\nnot created: no title; pass --title");
            }
            line
        },
    );
    Ok(())
}

pub fn resolve(ctx: &Context, response: Option<String>) -> Result<(), String> {
    let raw = match response {
        Some(value) => value,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("cannot read stdin: {err}"))?;
            buffer
        }
    };
    let response: NerResponse =
        serde_json::from_str(&raw).map_err(|err| format!("invalid NER response: {err}"))?;

    let gate = response.resolvable_entities().is_some();
    let resolved = resolve_deadline(&response.data, ctx.clock.today()).map(|r| r.into_draft());
    ctx.emit(json!({ "gate_passed": gate, "draft": resolved }), || {
        match &resolved {
            Some(draft) => render_draft(draft),
            None => "unresolved: no RELATIVE DAY entity".to_string(),
        }
    });
    Ok(())
}

pub fn ner_health(ctx: &Context) -> Result<(), String> {
    let client = ctx.ner();
    let status = client.health().map_err(|err| err.to_string())?;
    ctx.emit(json!({ "url": client.base_url(), "status": status }), || {
        format!("{} success={} {}", client.base_url(), status.success, status.message)
    });
    Ok(())
}

fn describe_status(status: &SuggestStatus) -> String {
    match status {
        SuggestStatus::Applied => "applied".to_string(),
        SuggestStatus::BlankInput => "kept (blank sentence)".to_string(),
        SuggestStatus::Gated { success, entities } => {
            format!("kept (ner success={success} entities={entities})")
        }
        SuggestStatus::Unresolved => "kept (no relative day)".to_string(),
        SuggestStatus::Failed(err) => format!("kept ({err})"),
    }
}

fn render_draft(draft: &TaskDraft) -> String {
    format!(
        "title=\"{}\" deadline={}",
        draft.title,
        format_deadline(draft.deadline)
    )
}

fn render_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{mark}] {} {} {}",
        task.id,
        task.deadline_string(),
        task.title
    )
}
