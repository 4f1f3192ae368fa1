//! Stable exit codes for the playground CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// A request failed (transport, status, or malformed body).
pub const FAILED: i32 = 1;
/// Invalid arguments or configuration.
pub const INVALID: i32 = 2;
