//! Aggregate state of one agent execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::history::{Event, EventSource, History};
use crate::core::metrics::Metrics;
use crate::core::root::RootTask;
use crate::core::types::{AgentState, TrafficControlState};

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Everything a controller needs to pick a run back up.
///
/// Field names form the persisted session layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunState {
    pub root_task: RootTask,
    pub iteration: u32,
    pub max_iterations: u32,
    pub confirmation_mode: bool,
    pub history: History,
    pub inputs: BTreeMap<String, Value>,
    pub outputs: BTreeMap<String, Value>,
    pub last_error: Option<String>,
    pub agent_state: AgentState,
    pub resume_state: Option<AgentState>,
    pub traffic_control_state: TrafficControlState,
    pub metrics: Metrics,
    pub delegate_level: u32,
    pub almost_stuck: u32,
}

impl Default for AgentRunState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS, false)
    }
}

impl AgentRunState {
    pub fn new(max_iterations: u32, confirmation_mode: bool) -> Self {
        Self {
            root_task: RootTask::new(),
            iteration: 0,
            max_iterations,
            confirmation_mode,
            history: History::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            last_error: None,
            agent_state: AgentState::Loading,
            resume_state: None,
            traffic_control_state: TrafficControlState::Normal,
            metrics: Metrics::new(),
            delegate_level: 0,
            almost_stuck: 0,
        }
    }

    /// The user instruction in force at the most recent finish.
    ///
    /// Walks history newest-first, remembering the latest user message seen.
    /// The first finish event reached after a user message has been captured
    /// returns that message; otherwise the last user message seen is returned.
    pub fn current_user_intent(&self) -> Option<&str> {
        let mut last_user_message = None;
        for event in self.history.events(true) {
            match event {
                Event::Message {
                    source: EventSource::User,
                    content,
                } => last_user_message = Some(content.as_str()),
                Event::AgentFinish { .. } if last_user_message.is_some() => {
                    return last_user_message;
                }
                _ => {}
            }
        }
        last_user_message
    }

    /// Leave the loading phase entered on restore.
    ///
    /// Moves to the preserved `resume_state`, or to `init` when there is none.
    /// Any other current state is left untouched.
    pub fn finish_loading(&mut self) -> AgentState {
        if self.agent_state == AgentState::Loading {
            self.agent_state = self.resume_state.take().unwrap_or(AgentState::Init);
            debug!(agent_state = %self.agent_state, "finished loading");
        }
        self.agent_state
    }

    pub fn next_iteration(&mut self) -> u32 {
        self.iteration = self.iteration.saturating_add(1);
        self.iteration
    }

    pub fn iterations_exhausted(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }
}
