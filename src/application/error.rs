//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{InvocationError, SpecError};
use crate::exitcode;

/// Top-level error a host program catches at its outermost boundary.
#[derive(Error, Debug)]
pub enum CommandLineError {
    #[error("{0}")]
    Spec(#[from] SpecError),

    #[error("{0}")]
    Invocation(#[from] InvocationError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type CommandLineResult<T> = Result<T, CommandLineError>;

impl CommandLineError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandLineError::Spec(_) | CommandLineError::Invocation(_) => exitcode::FAILURE,
            CommandLineError::Config { .. } => exitcode::CONFIG,
        }
    }
}
