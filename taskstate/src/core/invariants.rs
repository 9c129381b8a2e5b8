//! Structural invariants of a task tree that serde alone cannot enforce.

use crate::core::path::child_id;
use crate::core::root::RootTask;
use crate::core::task::Task;

/// Check that every task id equals its positional path under the root.
///
/// Returns a list of stable error messages (empty on success).
pub fn validate_invariants(root: &RootTask) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, task) in root.subtasks.iter().enumerate() {
        validate_node(task, &child_id("", index), &mut errors);
    }
    errors
}

fn validate_node(task: &Task, expected_id: &str, errors: &mut Vec<String>) {
    if task.id != expected_id {
        errors.push(format!(
            "task at {} has id '{}' (expected '{}')",
            expected_id, task.id, expected_id
        ));
    }
    for (index, subtask) in task.subtasks.iter().enumerate() {
        validate_node(subtask, &child_id(expected_id, index), errors);
    }
}
