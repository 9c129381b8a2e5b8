//! Ownership root of the plan and its addressing entry point.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::core::path::{child_id, parse_task_id, render_path};
use crate::core::task::{Task, TaskDraft};
use crate::core::types::TaskState;
use crate::error::{TaskError, TaskResult};

/// The root of a task tree. Its id is the empty string and it has no goal.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootTask {
    pub state: TaskState,
    pub subtasks: Vec<Task>,
}

/// A node resolved by [`RootTask::get_task_by_id`].
#[derive(Debug, Clone, Copy)]
pub enum TaskRef<'a> {
    Root(&'a RootTask),
    Task(&'a Task),
}

impl<'a> TaskRef<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            TaskRef::Root(_) => "",
            TaskRef::Task(task) => &task.id,
        }
    }

    pub fn goal(&self) -> &'a str {
        match *self {
            TaskRef::Root(_) => "",
            TaskRef::Task(task) => &task.goal,
        }
    }

    pub fn state(&self) -> TaskState {
        match *self {
            TaskRef::Root(root) => root.state,
            TaskRef::Task(task) => task.state,
        }
    }

    pub fn subtasks(&self) -> &'a [Task] {
        match *self {
            TaskRef::Root(root) => &root.subtasks,
            TaskRef::Task(task) => &task.subtasks,
        }
    }

    /// The task, or `None` for the root.
    pub fn as_task(&self) -> Option<&'a Task> {
        match *self {
            TaskRef::Root(_) => None,
            TaskRef::Task(task) => Some(task),
        }
    }
}

impl RootTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a dotted id. `""` is the root.
    pub fn get_task_by_id(&self, id: &str) -> TaskResult<TaskRef<'_>> {
        let path = self.resolve(id)?;
        let mut found = TaskRef::Root(self);
        for index in path {
            let task = found
                .subtasks()
                .get(index)
                .ok_or_else(|| TaskError::MalformedTaskId(id.to_string()))?;
            found = TaskRef::Task(task);
        }
        Ok(found)
    }

    /// Append a new open task under `parent_id` and return its id.
    ///
    /// Nested drafts are materialized with positional ids below the new task.
    pub fn add_subtask(
        &mut self,
        parent_id: &str,
        goal: impl Into<String>,
        drafts: Vec<TaskDraft>,
    ) -> TaskResult<String> {
        let path = self.resolve(parent_id)?;
        let parent = render_path(&path);
        let siblings = self.subtasks_mut(&path, parent_id)?;
        let id = child_id(&parent, siblings.len());
        siblings.push(Task::new(id.clone(), goal, drafts));
        Ok(id)
    }

    /// Apply `state` to the task at `id`, then re-check root completion.
    ///
    /// `in_progress` marks every ancestor in progress; finished states cascade
    /// into the task's non-abandoned descendants. Setting the root itself is a
    /// plain assignment.
    pub fn set_subtask_state(&mut self, id: &str, state: TaskState) -> TaskResult<()> {
        let previous = self.get_task_by_id(id)?.state();
        let path = self.resolve(id)?;
        debug!(task = %id, from = %previous, to = %state, "setting task state");
        if path.is_empty() {
            self.set_state(state);
        } else {
            apply_at(&mut self.subtasks, &path, state, id)?;
        }

        let unfinished = self
            .subtasks
            .iter()
            .filter(|task| !task.state.is_finished())
            .count();
        if unfinished == 0 {
            debug!("all top-level tasks finished; completing root");
            self.set_state(TaskState::Completed);
        }
        Ok(())
    }

    /// Plain assignment; the root never cascades.
    pub fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }

    /// The active leaf of the tree, if any task is in progress.
    pub fn current_task(&self) -> Option<&Task> {
        self.subtasks
            .iter()
            .find(|task| task.state == TaskState::InProgress)
            .and_then(Task::current_task)
    }

    pub fn is_completed(&self) -> bool {
        self.state == TaskState::Completed
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "id": "",
            "goal": "",
            "state": self.state,
            "subtasks": self.subtasks.iter().map(Task::to_dict).collect::<Vec<_>>(),
        })
    }

    pub fn render(&self) -> String {
        self.subtasks.iter().map(|task| task.render("")).collect()
    }

    fn resolve(&self, id: &str) -> TaskResult<Vec<usize>> {
        if id.is_empty() {
            return Ok(Vec::new());
        }
        if self.subtasks.is_empty() {
            return Err(TaskError::MalformedTaskId(id.to_string()));
        }
        let path = parse_task_id(id)?;
        let mut subtasks = &self.subtasks;
        for &index in &path {
            let task = subtasks
                .get(index)
                .ok_or_else(|| TaskError::MalformedTaskId(id.to_string()))?;
            subtasks = &task.subtasks;
        }
        Ok(path)
    }

    fn subtasks_mut(&mut self, path: &[usize], id: &str) -> TaskResult<&mut Vec<Task>> {
        let mut subtasks = &mut self.subtasks;
        for &index in path {
            let task = subtasks
                .get_mut(index)
                .ok_or_else(|| TaskError::MalformedTaskId(id.to_string()))?;
            subtasks = &mut task.subtasks;
        }
        Ok(subtasks)
    }
}

/// Set the task at `path` and, for `in_progress`, each ancestor on the way back up.
fn apply_at(subtasks: &mut [Task], path: &[usize], state: TaskState, id: &str) -> TaskResult<()> {
    let (&index, rest) = path
        .split_first()
        .ok_or_else(|| TaskError::MalformedTaskId(id.to_string()))?;
    let task = subtasks
        .get_mut(index)
        .ok_or_else(|| TaskError::MalformedTaskId(id.to_string()))?;
    if rest.is_empty() {
        task.set_state(state);
        return Ok(());
    }
    apply_at(&mut task.subtasks, rest, state, id)?;
    if state == TaskState::InProgress {
        task.state = TaskState::InProgress;
    }
    Ok(())
}
