//! Domain layer: parameter descriptors, value coercion and commands
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod command;
pub mod error;
pub mod names;
pub mod parameter;
pub mod value;

pub use command::{is_help_flag, Command, Handler, HelpSink, Invocable, IMPLICIT_NAME};
pub use error::{BoxError, CallbackPanic, InvocationError, SpecError, ValueError};
pub use parameter::{Factory, Label, Parameter, ParameterInfo, Validator};
pub use value::ArgValue;
