//! Hierarchical task state for resumable agent runs.
//!
//! Sessions live in the store configured by `.taskstate/config.toml`. Each
//! command restores one session, and mutating commands save it back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use taskstate::core::task::TaskDraft;
use taskstate::exit_codes;
use taskstate::inspect::{current_task, load_session, render_tree, status};
use taskstate::logging;
use taskstate::plan::{InitOptions, add_task, init_session, set_task_state};

#[derive(Parser)]
#[command(
    name = "taskstate",
    version,
    about = "Hierarchical task state for resumable agent runs"
)]
struct Cli {
    /// Workspace root containing `.taskstate/`.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Session to operate on.
    #[arg(short, long)]
    session: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a fresh run state for the session.
    Init {
        /// Overwrite an existing session.
        #[arg(short, long)]
        force: bool,
    },
    /// Add a task and print its id.
    Add {
        /// Parent task id (empty for a top-level task).
        #[arg(short, long, default_value = "")]
        parent: String,
        /// Goal of the new task.
        goal: String,
        /// Nested initial subtasks as JSON, e.g. `[{"goal":"a","subtasks":[]}]`.
        #[arg(long)]
        subtasks: Option<String>,
    },
    /// Set the state of a task (open, in_progress, completed, abandoned, verified).
    SetState { task_id: String, state: String },
    /// Print the task tree.
    Show,
    /// Print the task currently in progress.
    Current,
    /// Print the run's lifecycle state, iteration, and cost.
    Status,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = cli.root.as_path();
    let session = cli.session.as_str();
    match cli.command {
        Command::Init { force } => {
            init_session(root, session, &InitOptions { force })?;
        }
        Command::Add {
            parent,
            goal,
            subtasks,
        } => {
            let drafts = parse_drafts(subtasks.as_deref())?;
            let id = add_task(root, session, &parent, &goal, drafts)?;
            println!("{id}");
        }
        Command::SetState { task_id, state } => {
            let run = set_task_state(root, session, &task_id, &state)?;
            print!("{}", render_tree(&run));
        }
        Command::Show => {
            let run = load_session(root, session)?;
            print!("{}", render_tree(&run));
        }
        Command::Current => {
            let run = load_session(root, session)?;
            match current_task(&run) {
                Some(task) => println!("{} {}", task.id, task.goal),
                None => return Ok(exit_codes::NO_CURRENT_TASK),
            }
        }
        Command::Status => {
            let run = load_session(root, session)?;
            print!("{}", status(&run));
        }
    }
    Ok(exit_codes::OK)
}

fn parse_drafts(raw: Option<&str>) -> Result<Vec<TaskDraft>> {
    match raw {
        Some(raw) => serde_json::from_str(raw).context("parse --subtasks json"),
        None => Ok(Vec::new()),
    }
}
