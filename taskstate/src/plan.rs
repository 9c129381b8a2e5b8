//! Orchestration for commands that change a saved plan.
//!
//! Every mutation restores the session, leaves the loading phase, applies the
//! change, and saves. Nothing is written when the change itself fails.
//!
//! Leaving the loading phase follows the resume rule, so a session saved in a
//! state that is not resumable (`error`, `stopped`, `rejected`, ...) is saved
//! back as `init` after any edit.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::core::run_state::AgentRunState;
use crate::core::task::TaskDraft;
use crate::core::types::TaskState;
use crate::io::layout::Workspace;
use crate::io::session::{restore_from_session, save_to_session, session_exists};

/// Options for `init_session`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, replace an existing session.
    pub force: bool,
}

/// Create a fresh run under `session_id` using the workspace config.
pub fn init_session(root: &Path, session_id: &str, options: &InitOptions) -> Result<AgentRunState> {
    let workspace = Workspace::open(root)?;
    let exists = session_exists(&workspace.store, session_id)
        .with_context(|| format!("check session {session_id}"))?;
    if exists && !options.force {
        return Err(anyhow!(
            "session {session_id} already exists (use --force to overwrite)"
        ));
    }
    let state = workspace.config.new_run_state();
    save_to_session(&workspace.store, session_id, &state)
        .with_context(|| format!("save session {session_id}"))?;
    info!(session = %session_id, "initialized session");
    Ok(state)
}

/// Add a task under `parent_id` and return the new id.
pub fn add_task(
    root: &Path,
    session_id: &str,
    parent_id: &str,
    goal: &str,
    drafts: Vec<TaskDraft>,
) -> Result<String> {
    with_session(root, session_id, |state| {
        let id = state
            .root_task
            .add_subtask(parent_id, goal, drafts)
            .with_context(|| format!("add task under '{parent_id}'"))?;
        debug!(task = %id, "added task");
        Ok(id)
    })
}

/// Parse `state` and apply it to the task at `task_id`.
pub fn set_task_state(
    root: &Path,
    session_id: &str,
    task_id: &str,
    state: &str,
) -> Result<AgentRunState> {
    let state: TaskState = state.parse().context("parse task state")?;
    with_session(root, session_id, |run| {
        run.root_task
            .set_subtask_state(task_id, state)
            .with_context(|| format!("set state of task '{task_id}'"))?;
        Ok(run.clone())
    })
}

fn with_session<T>(
    root: &Path,
    session_id: &str,
    apply: impl FnOnce(&mut AgentRunState) -> Result<T>,
) -> Result<T> {
    let workspace = Workspace::open(root)?;
    let mut state = restore_from_session(&workspace.store, session_id)
        .with_context(|| format!("restore session {session_id}"))?;
    state.finish_loading();
    let value = apply(&mut state)?;
    save_to_session(&workspace.store, session_id, &state)
        .with_context(|| format!("save session {session_id}"))?;
    Ok(value)
}
