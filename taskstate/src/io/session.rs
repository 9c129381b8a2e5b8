//! Save and restore `AgentRunState` through a [`SessionStore`].
//!
//! Each session is one record at `sessions/<session_id>/agent_state`, holding
//! the base64 (standard alphabet) encoding of the JSON-serialized run state.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error, info};

use crate::core::history::History;
use crate::core::invariants::validate_invariants;
use crate::core::run_state::AgentRunState;
use crate::core::types::AgentState;
use crate::error::{SessionError, SessionResult};
use crate::io::store::SessionStore;

pub fn session_key(session_id: &str) -> String {
    format!("sessions/{session_id}/agent_state")
}

/// Session ids become a store path segment: `[A-Za-z0-9._-]`, not `.` or `..`.
pub fn validate_session_id(session_id: &str) -> SessionResult<()> {
    let well_formed = !session_id.is_empty()
        && session_id != "."
        && session_id != ".."
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(SessionError::InvalidSessionId(session_id.to_string()))
    }
}

pub fn session_exists<S: SessionStore + ?Sized>(store: &S, session_id: &str) -> SessionResult<bool> {
    validate_session_id(session_id)?;
    Ok(store.exists(&session_key(session_id))?)
}

/// Persist `state` under `session_id`. Failures are logged and returned.
pub fn save_to_session<S: SessionStore + ?Sized>(
    store: &S,
    session_id: &str,
    state: &AgentRunState,
) -> SessionResult<()> {
    debug!(session = %session_id, agent_state = %state.agent_state, "saving state to session");
    save_inner(store, session_id, state).inspect_err(|err| {
        error!(session = %session_id, error = %err, "failed to save state to session");
    })
}

fn save_inner<S: SessionStore + ?Sized>(
    store: &S,
    session_id: &str,
    state: &AgentRunState,
) -> SessionResult<()> {
    validate_session_id(session_id)?;
    let serialized = serde_json::to_vec(state).map_err(SessionError::Serialize)?;
    let encoded = STANDARD.encode(serialized);
    store.write(&session_key(session_id), &encoded)?;
    Ok(())
}

/// Load the run saved under `session_id` and put it back into `loading`.
///
/// A run saved in one of the resumable states keeps that state in
/// `resume_state`; any other saved state leaves `resume_state` empty. The
/// history is rebuilt empty at the saved cursors.
pub fn restore_from_session<S: SessionStore + ?Sized>(
    store: &S,
    session_id: &str,
) -> SessionResult<AgentRunState> {
    let state = restore_inner(store, session_id).inspect_err(|err| {
        error!(session = %session_id, error = %err, "failed to restore state from session");
    })?;
    info!(
        session = %session_id,
        resume_state = ?state.resume_state,
        iteration = state.iteration,
        "restored state from session"
    );
    Ok(state)
}

fn restore_inner<S: SessionStore + ?Sized>(
    store: &S,
    session_id: &str,
) -> SessionResult<AgentRunState> {
    validate_session_id(session_id)?;
    let encoded = store.read(&session_key(session_id))?;
    let serialized = STANDARD.decode(encoded.trim())?;
    let mut state: AgentRunState =
        serde_json::from_slice(&serialized).map_err(SessionError::Parse)?;

    let errors = validate_invariants(&state.root_task);
    if !errors.is_empty() {
        return Err(SessionError::Corrupt(errors.join("; ")));
    }
    if !state.metrics.is_consistent() {
        return Err(SessionError::Corrupt(
            "metrics contain negative or non-finite costs".to_string(),
        ));
    }

    state.resume_state = resume_state_for(state.agent_state);
    state.agent_state = AgentState::Loading;
    state.history = History::with_cursors(state.history.start_id, state.history.end_id);
    Ok(state)
}

fn resume_state_for(saved: AgentState) -> Option<AgentState> {
    saved.is_resumable().then_some(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::Event;
    use crate::core::types::TaskState;
    use crate::io::store::MemoryStore;
    use serde_json::json;
    use std::io;

    fn populated_state() -> AgentRunState {
        let mut state = AgentRunState::default();
        state
            .root_task
            .add_subtask("", "plan", Vec::new())
            .expect("add");
        state
            .root_task
            .add_subtask("0", "step", Vec::new())
            .expect("add");
        state
            .root_task
            .set_subtask_state("0.0", TaskState::InProgress)
            .expect("set");
        state.iteration = 7;
        state.metrics.add_cost(0.5).expect("cost");
        state.inputs.insert("task".to_string(), json!("fix the bug"));
        state.outputs.insert("answer".to_string(), json!({"ok": true}));
        state.history.push(Event::user_message("go"));
        state.history.push(Event::finish());
        state
    }

    #[test]
    fn record_is_base64_json_under_session_key() {
        let store = MemoryStore::new();
        let state = populated_state();
        save_to_session(&store, "s1", &state).expect("save");

        let raw = store.read("sessions/s1/agent_state").expect("read");
        let decoded = STANDARD.decode(raw).expect("base64");
        let value: serde_json::Value = serde_json::from_slice(&decoded).expect("json");
        assert_eq!(value["iteration"], 7);
        assert_eq!(value["agent_state"], "loading");
        assert_eq!(value["history"], json!({"start_id": 0, "end_id": 1}));
        assert_eq!(value["root_task"]["subtasks"][0]["subtasks"][0]["id"], "0.0");
    }

    #[test]
    fn round_trip_preserves_state_and_forces_loading() {
        let store = MemoryStore::new();
        let mut state = populated_state();
        state.agent_state = AgentState::Running;
        save_to_session(&store, "s1", &state).expect("save");

        let restored = restore_from_session(&store, "s1").expect("restore");

        assert_eq!(restored.root_task, state.root_task);
        assert_eq!(restored.iteration, state.iteration);
        assert_eq!(restored.metrics, state.metrics);
        assert_eq!(restored.inputs, state.inputs);
        assert_eq!(restored.outputs, state.outputs);
        assert_eq!(restored.agent_state, AgentState::Loading);
        assert_eq!(restored.resume_state, Some(AgentState::Running));
        assert_eq!(
            (restored.history.start_id, restored.history.end_id),
            (0, 1)
        );
        assert!(restored.history.is_empty());
    }

    #[test]
    fn resume_state_follows_resumable_set() {
        let cases = [
            (AgentState::Running, Some(AgentState::Running)),
            (AgentState::Paused, Some(AgentState::Paused)),
            (
                AgentState::AwaitingUserInput,
                Some(AgentState::AwaitingUserInput),
            ),
            (AgentState::Finished, Some(AgentState::Finished)),
            (AgentState::Error, None),
            (AgentState::Stopped, None),
            (AgentState::Loading, None),
            (AgentState::AwaitingUserConfirmation, None),
        ];
        let store = MemoryStore::new();
        for (saved, expected) in cases {
            let mut state = AgentRunState::default();
            state.agent_state = saved;
            state.resume_state = Some(AgentState::Init);
            save_to_session(&store, "cases", &state).expect("save");
            let restored = restore_from_session(&store, "cases").expect("restore");
            assert_eq!(restored.resume_state, expected, "{saved}");
            assert_eq!(restored.agent_state, AgentState::Loading);
        }
    }

    #[test]
    fn restore_missing_session_surfaces_io_error() {
        let store = MemoryStore::new();
        let err = restore_from_session(&store, "nope").expect_err("expected error");
        assert!(matches!(err, SessionError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn restore_rejects_invalid_base64_and_json() {
        let store = MemoryStore::new();
        store
            .write("sessions/bad/agent_state", "not base64!!")
            .expect("write");
        assert!(matches!(
            restore_from_session(&store, "bad"),
            Err(SessionError::Decode(_))
        ));

        store
            .write("sessions/bad/agent_state", &STANDARD.encode("{\"iteration\":1}"))
            .expect("write");
        assert!(matches!(
            restore_from_session(&store, "bad"),
            Err(SessionError::Parse(_))
        ));
    }

    #[test]
    fn restore_rejects_misnumbered_tree() {
        let store = MemoryStore::new();
        let mut state = populated_state();
        state.root_task.subtasks[0].id = "3".to_string();
        save_to_session(&store, "s1", &state).expect("save");

        let err = restore_from_session(&store, "s1").expect_err("expected error");
        assert!(matches!(err, SessionError::Corrupt(ref msg) if msg.contains("'3'")));
    }

    #[test]
    fn rejected_infinite_cost_keeps_session_restorable() {
        let store = MemoryStore::new();
        let mut state = populated_state();
        assert!(state.metrics.add_cost(f64::INFINITY).is_err());
        assert!(state.metrics.add_cost(f64::MAX).is_ok());
        assert!(state.metrics.add_cost(f64::MAX).is_err());
        save_to_session(&store, "s1", &state).expect("save");

        let restored = restore_from_session(&store, "s1").expect("restore");
        assert_eq!(restored.metrics, state.metrics);
    }

    #[test]
    fn restore_rejects_negative_metrics() {
        let store = MemoryStore::new();
        let mut value = serde_json::to_value(populated_state()).expect("json");
        value["metrics"]["accumulated_cost"] = json!(-1.0);
        let encoded = STANDARD.encode(serde_json::to_vec(&value).expect("bytes"));
        store
            .write("sessions/s1/agent_state", &encoded)
            .expect("write");

        let err = restore_from_session(&store, "s1").expect_err("expected error");
        assert!(matches!(err, SessionError::Corrupt(ref msg) if msg.contains("metrics")));
    }

    #[test]
    fn invalid_session_ids_are_rejected_before_io() {
        let store = MemoryStore::new();
        for bad in ["", ".", "..", "a/b", "white space"] {
            assert!(matches!(
                save_to_session(&store, bad, &AgentRunState::default()),
                Err(SessionError::InvalidSessionId(_))
            ));
        }
        assert!(validate_session_id("run-2024.10_a").is_ok());
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }

        fn read(&self, _key: &str) -> io::Result<String> {
            Err(io::Error::other("disk gone"))
        }

        fn exists(&self, _key: &str) -> io::Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn store_write_failure_is_returned_unchanged() {
        let err = save_to_session(&FailingStore, "s1", &AgentRunState::default())
            .expect_err("expected error");
        match err {
            SessionError::Io(inner) => assert_eq!(inner.to_string(), "disk full"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
