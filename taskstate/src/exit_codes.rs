//! Stable exit codes for taskstate CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config, session, task id, or other errors.
pub const INVALID: i32 = 1;
/// `taskstate current` found no task in progress.
pub const NO_CURRENT_TASK: i32 = 2;
