//! Command router: selects a command from the leading token, or forwards
//! everything to a single implicit command.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::application::usage;
use crate::config::Settings;
use crate::domain::{is_help_flag, Command, HelpSink, Invocable, InvocationError, SpecError};
use crate::exitcode;

/// Reserved flag enabling the diagnostic trace for one invocation.
pub const DEBUG_FLAG: &str = "--command-line-debug";

/// Sink for diagnostic or usage lines.
pub type LineFn = Arc<dyn Fn(&str) + Send + Sync>;

enum Mode {
    Implicit(Box<dyn Invocable>),
    Named(BTreeMap<String, Box<dyn Invocable>>),
}

/// Top-level entry point owning the registered commands.
pub struct CommandLine {
    description: String,
    program: String,
    mode: Mode,
    debug: bool,
    trace_fn: Option<LineFn>,
    output_fn: LineFn,
}

impl CommandLine {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            program: default_program_name(),
            mode: Mode::Named(BTreeMap::new()),
            debug: false,
            trace_fn: None,
            output_fn: Arc::new(|text: &str| println!("{text}")),
        }
    }

    /// Program name shown in usage text.
    pub fn with_program_name(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Destination of the diagnostic trace.
    pub fn with_trace_fn<F>(mut self, trace_fn: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.trace_fn = Some(Arc::new(trace_fn));
        self
    }

    /// Destination of usage text printed on help paths (default: stdout).
    pub fn with_output_fn<F>(mut self, output_fn: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.output_fn = Arc::new(output_fn);
        self
    }

    /// Trace every invocation, as if the debug flag were always given.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Apply loaded settings. A `debug` setting can only turn tracing on.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        if let Some(program) = &settings.program_name {
            self.program = program.clone();
        }
        self.debug |= settings.debug;
        self
    }

    /// Register a named command.
    pub fn add_command<R>(mut self, command: Command<R>) -> Result<Self, SpecError>
    where
        R: Default + 'static,
    {
        let name = command.name().to_string();
        if !command.has_handler() {
            return Err(SpecError::MissingHandler(name));
        }
        let commands = match &mut self.mode {
            Mode::Implicit(_) => return Err(SpecError::CommandAfterImplicit(name)),
            Mode::Named(commands) => commands,
        };
        if commands.contains_key(&name) {
            return Err(SpecError::DuplicateCommand(name));
        }
        debug!(command = %name, "registered command");
        commands.insert(name, Box::new(command));
        Ok(self)
    }

    /// Register the single command receiving all tokens.
    pub fn implicit_command<R>(mut self, command: Command<R>) -> Result<Self, SpecError>
    where
        R: Default + 'static,
    {
        match &self.mode {
            Mode::Implicit(_) => return Err(SpecError::ImplicitCommandExists),
            Mode::Named(commands) if !commands.is_empty() => {
                return Err(SpecError::ImplicitAfterCommands)
            }
            Mode::Named(_) => {}
        }
        if !command.has_handler() {
            return Err(SpecError::MissingHandler(command.name().to_string()));
        }
        debug!("registered implicit command");
        self.mode = Mode::Implicit(Box::new(command));
        Ok(self)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn implicit(&self) -> Option<&dyn Invocable> {
        match &self.mode {
            Mode::Implicit(command) => Some(command.as_ref()),
            Mode::Named(_) => None,
        }
    }

    /// Named commands, sorted by name.
    pub fn commands(&self) -> Vec<&dyn Invocable> {
        match &self.mode {
            Mode::Implicit(_) => Vec::new(),
            Mode::Named(commands) => commands.values().map(|c| c.as_ref()).collect(),
        }
    }

    /// Full usage listing of every command and parameter.
    pub fn usage(&self) -> String {
        usage::program_usage(self)
    }

    /// Parse `args` (without the program name) and dispatch to a handler.
    #[instrument(level = "debug", skip_all)]
    pub fn invoke<I, S>(&self, args: I) -> Result<i32, InvocationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        trace!(?raw, "raw tokens");
        let tokens: Vec<String> = raw
            .iter()
            .filter(|token| !token.eq_ignore_ascii_case(DEBUG_FLAG))
            .cloned()
            .collect();
        if self.debug || tokens.len() < raw.len() {
            self.trace_tokens(&tokens);
        }

        if tokens.first().is_some_and(|token| is_help_flag(token)) {
            (self.output_fn)(&self.usage());
            return Ok(exitcode::OK);
        }

        match &self.mode {
            Mode::Implicit(command) => command.invoke(&tokens, self),
            Mode::Named(commands) => {
                let (first, rest) = tokens
                    .split_first()
                    .ok_or(InvocationError::MissingCommand)?;
                let name = first.to_lowercase();
                let command = commands
                    .get(&name)
                    .ok_or(InvocationError::UnknownCommand(name))?;
                debug!(command = %command.name(), "selected command");
                command.invoke(rest, self)
            }
        }
    }

    /// Invoke with the arguments of the current process.
    pub fn invoke_from_env(&self) -> Result<i32, InvocationError> {
        self.invoke(std::env::args().skip(1))
    }

    /// Trace the tokens as key and command matching sees them, lowercased.
    fn trace_tokens(&self, tokens: &[String]) {
        let Some(trace_fn) = &self.trace_fn else {
            return;
        };
        trace_fn(">> Trace");
        trace_fn("  Invoke(args):");
        for (n, token) in tokens.iter().enumerate() {
            trace_fn(&format!("  [{n}]: '{}'", token.to_lowercase()));
        }
        trace_fn("<< Trace");
    }
}

impl HelpSink for CommandLine {
    fn command_help(&self, command: &dyn Invocable) {
        (self.output_fn)(&usage::command_usage(&self.program, command));
    }
}

fn default_program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rsargs".to_string())
}
