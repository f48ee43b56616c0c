//! Declarative, strongly-typed command-line parsing.
//!
//! Register commands (or one implicit command) with typed parameters, then hand
//! the process arguments to a [`CommandLine`]. Each invocation resolves the
//! command, coerces every `--name value` / `-alias value` pair into its declared
//! type, validates it, binds all parameters into a fresh record and calls the
//! command's handler with it.
//!
//! ```
//! use rsargs::{Command, CommandLine, Parameter};
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//!     times: u32,
//! }
//!
//! let cli = CommandLine::new("Greeter")
//!     .add_command(
//!         Command::<Greet>::new("greet", "Say hello")?
//!             .handler(|g| {
//!                 for _ in 0..g.times {
//!                     println!("hello {}", g.name);
//!                 }
//!                 0
//!             })
//!             .parameter(Parameter::<String>::new("name", "Who")?.alias("n")?, |g, v| g.name = v)?
//!             .parameter(Parameter::<u32>::new("times", "How often")?.optional(1), |g, v| g.times = v)?,
//!     )?;
//!
//! assert_eq!(cli.invoke(["greet", "-n", "world"])?, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{CommandLine, CommandLineError, CommandLineResult, DEBUG_FLAG};
pub use config::Settings;
pub use domain::{
    ArgValue, BoxError, Command, Invocable, InvocationError, Parameter, ParameterInfo, SpecError,
    ValueError,
};
