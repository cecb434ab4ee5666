//! `nertodo` command-line entry point.
//!
//! # Responsibility
//! - Parse global options and subcommands.
//! - Build configuration, start logging, and dispatch to command handlers.
//!
//! Exit code is `0` on success, `1` on any error (one-line message on stderr).

mod commands;

use clap::{Parser, Subcommand};
use nertodo_core::{init_logging, parse_deadline, AppConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "nertodo", version)]
#[command(about = "Multi-user to-do list with NER-assisted deadlines")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Base URL of the NER service.
    #[arg(long, global = true)]
    ner_url: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// Session token returned by `signin`.
    #[arg(long, global = true, env = "NERTODO_SESSION", hide_env_values = true)]
    session: Option<String>,
    /// Pin "today" (YYYY-MM-DD) instead of reading the UTC wall clock.
    #[arg(long, global = true)]
    today: Option<String>,
    /// Print machine-readable JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and print a session token.
    Signin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the current session.
    Signout,
    /// Show the signed-in user.
    Whoami,
    /// Add a task.
    Add {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD; defaults to today.
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List your tasks by deadline.
    List,
    /// Mark a task completed.
    Done { task_id: String },
    /// Mark a task not completed.
    Undo { task_id: String },
    /// Pre-fill a task from a sentence using the NER service.
    Suggest {
        sentence: String,
        /// Title kept when no suggestion applies.
        #[arg(long, default_value = "")]
        title: String,
        /// Deadline kept when no suggestion applies; defaults to today.
        #[arg(long)]
        deadline: Option<String>,
        /// Create the task when a suggestion was applied.
        #[arg(long, default_value_t = false)]
        create: bool,
    },
    /// Resolve a NER response JSON offline (argument or stdin).
    Resolve { response: Option<String> },
    /// Check that the NER service is reachable.
    NerHealth,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    log::info!(
        "event=cli_start module=cli status=ok version={}",
        nertodo_core::core_version()
    );

    let today = cli
        .today
        .as_deref()
        .map(|value| parse_deadline(value).ok_or_else(|| format!("invalid --today `{value}`")))
        .transpose()?;
    let ctx = commands::Context::new(config, today, cli.session.as_deref(), cli.json);

    match cli.command {
        Commands::Signup {
            email,
            username,
            password,
        } => commands::sign_up(&ctx, &email, &username, &password),
        Commands::Signin { username, password } => commands::sign_in(&ctx, &username, &password),
        Commands::Signout => commands::sign_out(&ctx),
        Commands::Whoami => commands::who_am_i(&ctx),
        Commands::Add { title, deadline } => commands::add_task(&ctx, &title, deadline.as_deref()),
        Commands::List => commands::list_tasks(&ctx),
        Commands::Done { task_id } => commands::set_completed(&ctx, &task_id, true),
        Commands::Undo { task_id } => commands::set_completed(&ctx, &task_id, false),
        Commands::Suggest {
            sentence,
            title,
            deadline,
            create,
        } => commands::suggest(&ctx, &sentence, &title, deadline.as_deref(), create),
        Commands::Resolve { response } => commands::resolve(&ctx, response),
        Commands::NerHealth => commands::ner_health(&ctx),
    }
}

fn build_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(url) = &cli.ner_url {
        config
            .set_ner_base_url(url)
            .map_err(|err| err.to_string())?;
    }
    if let Some(level) = &cli.log_level {
        config
            .set_log_level(level)
            .map_err(|err| err.to_string())?;
    }
    if let Some(dir) = &cli.log_dir {
        config.set_log_dir(dir).map_err(|err| err.to_string())?;
    }
    Ok(config)
}
