//! Helpers for dotted task ids.
//!
//! A task id is the `.`-separated list of sibling indices leading from the root
//! to the task. The root itself is the empty id.

use crate::error::{TaskError, TaskResult};

/// Split `id` into sibling indices. The empty id yields an empty path.
///
/// Every segment must be a non-empty run of ASCII digits; range checks are left
/// to the tree walk.
pub fn parse_task_id(id: &str) -> TaskResult<Vec<usize>> {
    if id.is_empty() {
        return Ok(Vec::new());
    }
    id.split('.')
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TaskError::MalformedTaskId(id.to_string()));
            }
            segment
                .parse::<usize>()
                .map_err(|_| TaskError::MalformedTaskId(id.to_string()))
        })
        .collect()
}

/// Id of the child at `index` under `parent_id`.
pub fn child_id(parent_id: &str, index: usize) -> String {
    if parent_id.is_empty() {
        index.to_string()
    } else {
        format!("{parent_id}.{index}")
    }
}

/// Render a path of indices back into a dotted id.
pub fn render_path(path: &[usize]) -> String {
    path.iter()
        .map(|index| index.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_id_splits_segments() {
        assert_eq!(parse_task_id("2.0.1"), Ok(vec![2, 0, 1]));
        assert_eq!(parse_task_id(""), Ok(Vec::new()));
    }

    #[test]
    fn parse_task_id_rejects_non_numeric_segments() {
        for bad in ["a", "0.x", "0..1", ".0", "0.", "-1", "+1", " 1", "1.2e3"] {
            assert_eq!(
                parse_task_id(bad),
                Err(TaskError::MalformedTaskId(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn parse_task_id_rejects_overflowing_segment() {
        let huge = "99999999999999999999999999";
        assert!(parse_task_id(huge).is_err());
    }

    #[test]
    fn child_id_joins_on_dot_except_under_root() {
        assert_eq!(child_id("", 3), "3");
        assert_eq!(child_id("3", 0), "3.0");
        assert_eq!(child_id("3.0", 12), "3.0.12");
    }

    #[test]
    fn render_path_inverts_parse() {
        let path = parse_task_id("4.0.7").expect("parse");
        assert_eq!(render_path(&path), "4.0.7");
    }
}
