//! Application layer: command routing and usage rendering
//!
//! This layer drives the domain commands and talks to the host (help output,
//! diagnostic trace).

pub mod error;
pub mod router;
pub mod usage;

pub use error::{CommandLineError, CommandLineResult};
pub use router::{CommandLine, LineFn, DEBUG_FLAG};
