//! A single node of the plan.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::core::path::child_id;
use crate::core::types::TaskState;

/// A unit of work with a goal, a state, and ordered subtasks.
///
/// The parent of a task is implied by its id; the tree root owns every node
/// and applies ancestor propagation (see [`crate::core::root::RootTask`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub goal: String,
    pub state: TaskState,
    pub subtasks: Vec<Task>,
}

/// Shape accepted when creating tasks with nested initial subtasks.
///
/// New tasks always start `open`; a `state` key in planner output is ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDraft {
    pub goal: String,
    #[serde(default)]
    pub subtasks: Vec<TaskDraft>,
}

impl TaskDraft {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            subtasks: Vec::new(),
        }
    }

    pub fn with_subtasks(mut self, subtasks: Vec<TaskDraft>) -> Self {
        self.subtasks = subtasks;
        self
    }
}

impl Task {
    /// Build a task with `id`, materializing `drafts` as its children.
    pub fn new(id: String, goal: impl Into<String>, drafts: Vec<TaskDraft>) -> Self {
        let goal = goal.into();
        debug!(task = %id, goal = %goal, "creating task");
        let subtasks = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| Task::new(child_id(&id, index), draft.goal, draft.subtasks))
            .collect();
        Self {
            id,
            goal,
            state: TaskState::Open,
            subtasks,
        }
    }

    /// Set this task's state, pushing finished states down the subtree.
    ///
    /// Children already `abandoned` keep their state. `in_progress` is
    /// propagated upward by the owning root, which knows the ancestor chain.
    pub(crate) fn set_state(&mut self, state: TaskState) {
        self.state = state;
        if state.is_finished() {
            for subtask in &mut self.subtasks {
                if subtask.state != TaskState::Abandoned {
                    subtask.set_state(state);
                }
            }
        }
    }

    /// The active leaf at or below this task, if any.
    pub fn current_task(&self) -> Option<&Task> {
        for subtask in &self.subtasks {
            if subtask.state == TaskState::InProgress {
                return subtask.current_task();
            }
        }
        if self.state == TaskState::InProgress {
            return Some(self);
        }
        None
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "id": self.id,
            "goal": self.goal,
            "state": self.state,
            "subtasks": self.subtasks.iter().map(Task::to_dict).collect::<Vec<_>>(),
        })
    }

    /// Indented, one line per task, four spaces per level.
    pub fn render(&self, indent: &str) -> String {
        let mut out = format!("{indent}{} {} {}\n", self.state.glyph(), self.id, self.goal);
        let nested = format!("{indent}    ");
        for subtask in &self.subtasks {
            out.push_str(&subtask.render(&nested));
        }
        out
    }
}
