//! Exit codes surfaced by the command line and its hosts

/// Successful termination, also returned by help paths
pub const OK: i32 = 0;

/// Any registration or invocation error caught at the outermost boundary
pub const FAILURE: i32 = 1;

/// Configuration error (BSD sysexits.h compatible)
pub const CONFIG: i32 = 78;
