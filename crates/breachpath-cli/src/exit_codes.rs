//! Process exit codes. Part of the CLI contract.

pub const OK: i32 = 0;
/// The run finished but at least one expectation or scenario failed.
pub const EXPECTATION_FAILED: i32 = 1;
/// Unreadable document or config, invalid model, unknown step, or an
/// aborted run.
pub const CONFIG_ERROR: i32 = 2;
