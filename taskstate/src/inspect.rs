//! Read-only views of a saved session for `show`, `current`, and `status`.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::run_state::AgentRunState;
use crate::core::types::{AgentState, TaskState, TrafficControlState};
use crate::io::layout::Workspace;
use crate::io::session::restore_from_session;

/// The task currently being worked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTask {
    pub id: String,
    pub goal: String,
}

/// Summary printed by `taskstate status`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub agent_state: AgentState,
    pub resume_state: Option<AgentState>,
    pub traffic_control_state: TrafficControlState,
    pub root_state: TaskState,
    pub iteration: u32,
    pub max_iterations: u32,
    pub accumulated_cost: f64,
    pub last_error: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "agent_state: {}", self.agent_state)?;
        match self.resume_state {
            Some(state) => writeln!(f, "resume_state: {state}")?,
            None => writeln!(f, "resume_state: none")?,
        }
        writeln!(f, "traffic_control_state: {}", self.traffic_control_state)?;
        writeln!(f, "plan: {}", self.root_state)?;
        writeln!(f, "iteration: {}/{}", self.iteration, self.max_iterations)?;
        writeln!(f, "accumulated_cost: {}", self.accumulated_cost)?;
        if let Some(err) = &self.last_error {
            writeln!(f, "last_error: {err}")?;
        }
        Ok(())
    }
}

pub fn load_session(root: &Path, session_id: &str) -> Result<AgentRunState> {
    let workspace = Workspace::open(root)?;
    restore_from_session(&workspace.store, session_id)
        .with_context(|| format!("restore session {session_id}"))
}

pub fn render_tree(state: &AgentRunState) -> String {
    state.root_task.render()
}

pub fn current_task(state: &AgentRunState) -> Option<CurrentTask> {
    state.root_task.current_task().map(|task| CurrentTask {
        id: task.id.clone(),
        goal: task.goal.clone(),
    })
}

/// Status as seen right after a restore: `agent_state` is `loading` and
/// `resume_state` tells what the run would continue as.
pub fn status(state: &AgentRunState) -> StatusReport {
    StatusReport {
        agent_state: state.agent_state,
        resume_state: state.resume_state,
        traffic_control_state: state.traffic_control_state,
        root_state: state.root_task.state,
        iteration: state.iteration,
        max_iterations: state.max_iterations,
        accumulated_cost: state.metrics.accumulated_cost(),
        last_error: state.last_error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_task_reports_active_leaf() {
        let mut state = AgentRunState::default();
        state
            .root_task
            .add_subtask("", "outer", Vec::new())
            .expect("add");
        state
            .root_task
            .add_subtask("0", "inner", Vec::new())
            .expect("add");
        assert_eq!(current_task(&state), None);

        state
            .root_task
            .set_subtask_state("0.0", TaskState::InProgress)
            .expect("set");
        assert_eq!(
            current_task(&state),
            Some(CurrentTask {
                id: "0.0".to_string(),
                goal: "inner".to_string(),
            })
        );
    }

    #[test]
    fn status_report_renders_resume_state() {
        let mut state = AgentRunState::new(10, false);
        state.resume_state = Some(AgentState::Paused);
        state.iteration = 3;
        state.record_error("model timed out");
        let text = status(&state).to_string();
        assert_eq!(
            text,
            "agent_state: loading\nresume_state: paused\ntraffic_control_state: normal\n\
             plan: open\niteration: 3/10\naccumulated_cost: 0\nlast_error: model timed out\n"
        );
    }
}
