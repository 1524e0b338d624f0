//! Stable exit codes for vlink CLI commands.

/// Command succeeded, or the operator cancelled a selection prompt.
pub const OK: i32 = 0;
/// Command failed (auth check, project listing, config, I/O or other errors).
pub const FAILED: i32 = 1;
/// `vlink link` found no teams or no apps to work on.
pub const NOTHING_TO_DO: i32 = 2;
