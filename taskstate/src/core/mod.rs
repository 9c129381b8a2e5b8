//! Deterministic, pure logic for the task tree and run state.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod history;
pub mod invariants;
pub mod metrics;
pub mod path;
pub mod root;
pub mod run_state;
pub mod task;
pub mod types;
