//! Hierarchical task state machine and resumable agent session state.
//!
//! An agent's plan of work is a tree of tasks addressed by dotted index paths
//! (`"2.0.1"`). State changes cascade through the tree, and the aggregate run
//! state can be checkpointed to a key/value store and restored later.
//!
//! - **[`core`]**: Pure, deterministic logic (task tree, propagation, run
//!   state, metrics). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (session store, persistence,
//!   configuration). Isolated behind the [`io::store::SessionStore`] seam.
//!
//! Orchestration modules ([`plan`], [`inspect`]) coordinate core logic with I/O
//! to implement CLI commands.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod plan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
