//! Shared state enums for tasks and agent runs.
//!
//! Serialized names are snake_case and form part of the persisted session
//! layout, so they must not change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::TaskError;

/// State of a single task in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Open,
    InProgress,
    Completed,
    Abandoned,
    Verified,
}

impl TaskState {
    pub const ALL: [TaskState; 5] = [
        TaskState::Open,
        TaskState::InProgress,
        TaskState::Completed,
        TaskState::Abandoned,
        TaskState::Verified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Open => "open",
            TaskState::InProgress => "in_progress",
            TaskState::Completed => "completed",
            TaskState::Abandoned => "abandoned",
            TaskState::Verified => "verified",
        }
    }

    /// True for the states that are pushed down onto non-abandoned children.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Abandoned | TaskState::Verified
        )
    }

    pub fn glyph(self) -> &'static str {
        match self {
            TaskState::Verified => "✅",
            TaskState::Completed => "🟢",
            TaskState::Abandoned => "❌",
            TaskState::InProgress => "💪",
            TaskState::Open => "🔵",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                error!(state = %s, "invalid task state");
                TaskError::InvalidState(s.to_string())
            })
    }
}

/// Lifecycle state of the agent driving a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Loading,
    Init,
    Running,
    AwaitingUserInput,
    Paused,
    Stopped,
    Finished,
    Rejected,
    Error,
    AwaitingUserConfirmation,
    UserConfirmed,
    UserRejected,
}

/// States from which a restored run may continue once loading completes.
pub const RESUMABLE_STATES: [AgentState; 4] = [
    AgentState::Running,
    AgentState::Paused,
    AgentState::AwaitingUserInput,
    AgentState::Finished,
];

impl AgentState {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Loading => "loading",
            AgentState::Init => "init",
            AgentState::Running => "running",
            AgentState::AwaitingUserInput => "awaiting_user_input",
            AgentState::Paused => "paused",
            AgentState::Stopped => "stopped",
            AgentState::Finished => "finished",
            AgentState::Rejected => "rejected",
            AgentState::Error => "error",
            AgentState::AwaitingUserConfirmation => "awaiting_user_confirmation",
            AgentState::UserConfirmed => "user_confirmed",
            AgentState::UserRejected => "user_rejected",
        }
    }

    pub fn is_resumable(self) -> bool {
        RESUMABLE_STATES.contains(&self)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate/volume control mode applied to agent actions by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficControlState {
    #[default]
    Normal,
    Throttling,
    Paused,
}

impl fmt::Display for TrafficControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrafficControlState::Normal => "normal",
            TrafficControlState::Throttling => "throttling",
            TrafficControlState::Paused => "paused",
        })
    }
}
