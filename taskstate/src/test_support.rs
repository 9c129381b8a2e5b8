//! Test-only helpers for building task trees and scratch workspaces.

use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::core::run_state::AgentRunState;
use crate::core::task::Task;
use crate::core::types::TaskState;
use crate::io::layout::Workspace;
use crate::io::session::{restore_from_session, session_key};
use crate::io::store::SessionStore;

/// Create an open task with a deterministic goal and no children.
///
/// `id` is used verbatim, so callers can build deliberately misnumbered trees.
pub fn leaf(id: &str) -> Task {
    Task {
        id: id.to_string(),
        goal: format!("{id} goal"),
        state: TaskState::Open,
        subtasks: Vec::new(),
    }
}

/// Create a task with an explicit state.
pub fn leaf_in(id: &str, state: TaskState) -> Task {
    Task { state, ..leaf(id) }
}

/// Create a task with children using deterministic defaults.
pub fn task_with_children(id: &str, subtasks: Vec<Task>) -> Task {
    Task {
        subtasks,
        ..leaf(id)
    }
}

/// A temporary workspace root with the default `.taskstate/` layout.
pub struct TestWorkspace {
    temp: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn workspace(&self) -> Result<Workspace> {
        Workspace::open(self.path())
    }

    pub fn restore(&self, session_id: &str) -> Result<AgentRunState> {
        let workspace = self.workspace()?;
        Ok(restore_from_session(&workspace.store, session_id)?)
    }

    /// The encoded record exactly as stored.
    pub fn raw_record(&self, session_id: &str) -> Result<String> {
        let workspace = self.workspace()?;
        Ok(workspace.store.read(&session_key(session_id))?)
    }
}
