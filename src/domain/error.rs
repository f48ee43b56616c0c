//! Domain-level errors (no external dependencies)

use std::any::Any;

use thiserror::Error;

/// Boxed cause attached to coercion, factory and validation failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registration-time mistakes by the integrator.
/// They are raised while the command tree is built, never during an invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("bad command name '{name}': name must match {pattern}")]
    BadCommandName { name: String, pattern: &'static str },

    #[error("bad parameter name '{name}': name must match {pattern}")]
    BadParameterName { name: String, pattern: &'static str },

    #[error("parameter '{parameter}': bad alias '{alias}': alias must match {pattern}")]
    BadAlias {
        parameter: String,
        alias: String,
        pattern: &'static str,
    },

    #[error("command '{command}': duplicate parameter name '{name}'")]
    DuplicateParameter { command: String, name: String },

    #[error("command '{command}': duplicate alias '{alias}'")]
    DuplicateAlias { command: String, alias: String },

    #[error("duplicate command name '{0}'")]
    DuplicateCommand(String),

    #[error("implicit command already exists")]
    ImplicitCommandExists,

    #[error("can't add command '{0}' to a command line with an implicit command")]
    CommandAfterImplicit(String),

    #[error("can't create an implicit command on a command line with named commands")]
    ImplicitAfterCommands,

    #[error("command '{0}' has no handler")]
    MissingHandler(String),
}

/// Invocation errors are runtime failures tied to one concrete token list.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("expected command is missing")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("mismatch in parameter names and values ({count} tokens)")]
    Mismatch { count: usize },

    #[error("parameter '{parameter}', value='{value}': repeated parameter")]
    RepeatedParameter { parameter: String, value: String },

    #[error("parameter '{parameter}', value='{value}': malformed value")]
    Format {
        parameter: String,
        value: String,
        #[source]
        source: BoxError,
    },

    #[error("parameter '{parameter}', value='{value}': factory function failed")]
    Factory {
        parameter: String,
        value: String,
        #[source]
        source: BoxError,
    },

    #[error("parameter '{parameter}', value='{value}': validate function failed")]
    Validation {
        parameter: String,
        value: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("missing required parameter '{0}'")]
    MissingRequiredParameter(String),

    #[error("parameter '{parameter}': cannot bind value to field '{field}'")]
    Bind { parameter: String, field: String },

    #[error("command '{0}' has no handler")]
    MissingHandler(String),
}

/// Failure of a built-in literal coercion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid {kind} literal '{literal}': {reason}")]
    Invalid {
        kind: &'static str,
        literal: String,
        reason: String,
    },

    #[error("unrecognized bool literal '{0}'")]
    Bool(String),

    #[error("'{literal}' is not a member of {type_name} (expected one of: {expected})")]
    Enum {
        literal: String,
        type_name: &'static str,
        expected: String,
    },
}

impl ValueError {
    pub fn invalid(kind: &'static str, literal: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            kind,
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A user-supplied factory or validate function panicked.
#[derive(Error, Debug)]
#[error("callback panicked: {message}")]
pub struct CallbackPanic {
    pub message: String,
}

impl CallbackPanic {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }
}

impl InvocationError {
    /// Name of the parameter the error is scoped to, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::RepeatedParameter { parameter, .. }
            | Self::Format { parameter, .. }
            | Self::Factory { parameter, .. }
            | Self::Validation { parameter, .. }
            | Self::Bind { parameter, .. } => Some(parameter),
            Self::MissingRequiredParameter(name) => Some(name),
            _ => None,
        }
    }
}
