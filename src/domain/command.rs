//! Commands: parameter registration and the per-invocation state machine.
//!
//! An invocation runs through four states: help check, token scan, bind and
//! dispatch. Parsed values are held in an [`InvocationContext`] created fresh
//! for every call, so a registered command can be invoked any number of times,
//! from any number of threads.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::error::{InvocationError, SpecError};
use crate::domain::names;
use crate::domain::parameter::{Parameter, ParameterInfo};
use crate::exitcode;

/// Name carried by the anonymous command of an implicit command line.
pub const IMPLICIT_NAME: &str = "implicit";

pub const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

pub fn is_help_flag(token: &str) -> bool {
    HELP_FLAGS.contains(&token.to_lowercase().as_str())
}

/// Function from a fully bound record to an exit code.
pub type Handler<R> = Arc<dyn Fn(R) -> i32 + Send + Sync>;

type Setter<R, T> = Arc<dyn Fn(&mut R, T) + Send + Sync>;

type Erased = Box<dyn Any + Send>;

/// Receives help requests raised while a command scans its tokens.
pub trait HelpSink {
    fn command_help(&self, command: &dyn Invocable);
}

/// Object-safe view of a command, independent of its record type.
pub trait Invocable: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Parameters in declaration order.
    fn parameters(&self) -> Vec<&dyn ParameterInfo>;
    fn has_handler(&self) -> bool;
    fn invoke(&self, args: &[String], help: &dyn HelpSink) -> Result<i32, InvocationError>;
}

/// A descriptor together with the setter writing its value into `R`.
trait Slot<R>: Send + Sync {
    fn info(&self) -> &dyn ParameterInfo;
    fn parse(&self, raw: &str) -> Result<Erased, InvocationError>;
    fn bind(&self, record: &mut R, value: Option<Erased>) -> Result<(), InvocationError>;
}

struct Binding<R, T> {
    parameter: Parameter<T>,
    setter: Setter<R, T>,
}

impl<R, T> Slot<R> for Binding<R, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn info(&self) -> &dyn ParameterInfo {
        &self.parameter
    }

    fn parse(&self, raw: &str) -> Result<Erased, InvocationError> {
        let value = self.parameter.parse(raw)?;
        self.parameter.check(&value, raw)?;
        Ok(Box::new(value))
    }

    fn bind(&self, record: &mut R, value: Option<Erased>) -> Result<(), InvocationError> {
        let value = match value {
            Some(erased) => *erased
                .downcast::<T>()
                .map_err(|_| InvocationError::Bind {
                    parameter: self.parameter.name().to_string(),
                    field: self.parameter.target_field().to_string(),
                })?,
            None => match self.parameter.default_value() {
                Some(default) => default.clone(),
                None => {
                    return Err(InvocationError::MissingRequiredParameter(
                        self.parameter.name().to_string(),
                    ))
                }
            },
        };
        (self.setter)(record, value);
        Ok(())
    }
}

/// Values supplied during one invocation, one slot per declared parameter.
struct InvocationContext {
    values: Vec<Option<Erased>>,
}

impl InvocationContext {
    fn new(len: usize) -> Self {
        Self {
            values: (0..len).map(|_| None).collect(),
        }
    }

    fn was_supplied(&self, index: usize) -> bool {
        self.values[index].is_some()
    }

    fn supply(&mut self, index: usize, value: Erased) {
        self.values[index] = Some(value);
    }

    fn take(&mut self, index: usize) -> Option<Erased> {
        self.values[index].take()
    }
}

/// A command binding its parameters into a fresh `R` per invocation.
pub struct Command<R> {
    name: String,
    description: String,
    slots: Vec<Box<dyn Slot<R>>>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    handler: Option<Handler<R>>,
}

impl<R> Command<R>
where
    R: Default + 'static,
{
    pub fn new(name: &str, description: &str) -> Result<Self, SpecError> {
        let name = names::command_name(name)?;
        Ok(Self::named(name, description))
    }

    /// The anonymous command of an implicit command line.
    pub fn implicit(description: &str) -> Self {
        Self::named(IMPLICIT_NAME.to_string(), description)
    }

    fn named(name: String, description: &str) -> Self {
        Self {
            name,
            description: description.to_string(),
            slots: Vec::new(),
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
            handler: None,
        }
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(R) -> i32 + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Register `parameter`; `setter` writes its final value into the record.
    pub fn parameter<T, S>(mut self, parameter: Parameter<T>, setter: S) -> Result<Self, SpecError>
    where
        T: Clone + Send + Sync + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        if self.by_name.contains_key(parameter.name()) {
            return Err(SpecError::DuplicateParameter {
                command: self.name.clone(),
                name: parameter.name().to_string(),
            });
        }
        let mut seen: Vec<&str> = Vec::new();
        for alias in parameter.aliases() {
            if self.by_alias.contains_key(alias) || seen.contains(&alias.as_str()) {
                return Err(SpecError::DuplicateAlias {
                    command: self.name.clone(),
                    alias: alias.clone(),
                });
            }
            seen.push(alias);
        }

        let index = self.slots.len();
        self.by_name.insert(parameter.name().to_string(), index);
        for alias in parameter.aliases() {
            self.by_alias.insert(alias.clone(), index);
        }
        debug!(command = %self.name, parameter = %parameter.name(), "registered parameter");
        self.slots.push(Box::new(Binding {
            parameter,
            setter: Arc::new(setter),
        }));
        Ok(self)
    }

    /// Map a `--name` or `-alias` key to a slot index.
    fn resolve(&self, key: &str) -> Result<usize, InvocationError> {
        let key = key.to_lowercase();
        let found = if let Some(name) = key.strip_prefix("--") {
            self.by_name.get(name)
        } else if let Some(alias) = key.strip_prefix('-') {
            self.by_alias.get(alias)
        } else {
            None
        };
        found
            .copied()
            .ok_or(InvocationError::UnknownParameter(key))
    }

    fn scan(&self, args: &[String]) -> Result<InvocationContext, InvocationError> {
        if args.len() % 2 != 0 {
            return Err(InvocationError::Mismatch { count: args.len() });
        }
        let mut context = InvocationContext::new(self.slots.len());
        for pair in args.chunks_exact(2) {
            let (key, raw) = (&pair[0], &pair[1]);
            let index = self.resolve(key)?;
            let slot = &self.slots[index];
            if context.was_supplied(index) {
                return Err(InvocationError::RepeatedParameter {
                    parameter: slot.info().name().to_string(),
                    value: raw.clone(),
                });
            }
            trace!(parameter = %slot.info().name(), raw = %raw, "scanned pair");
            context.supply(index, slot.parse(raw)?);
        }
        Ok(context)
    }

    fn bind(&self, mut context: InvocationContext) -> Result<R, InvocationError> {
        let mut record = R::default();
        for (index, slot) in self.slots.iter().enumerate() {
            slot.bind(&mut record, context.take(index))?;
        }
        Ok(record)
    }
}

impl<R> Invocable for Command<R>
where
    R: Default + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Vec<&dyn ParameterInfo> {
        self.slots.iter().map(|slot| slot.info()).collect()
    }

    fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    #[instrument(level = "debug", skip_all, fields(command = %self.name))]
    fn invoke(&self, args: &[String], help: &dyn HelpSink) -> Result<i32, InvocationError> {
        if args.first().is_some_and(|token| is_help_flag(token)) {
            help.command_help(self);
            return Ok(exitcode::OK);
        }
        let context = self.scan(args)?;
        let record = self.bind(context)?;
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| InvocationError::MissingHandler(self.name.clone()))?;
        debug!("dispatching to handler");
        Ok(handler(record))
    }
}

impl<R> fmt::Debug for Command<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("parameters", &self.by_name.keys().collect::<Vec<_>>())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Params {
        name: String,
        count: i32,
        verbose: bool,
    }

    #[derive(Default)]
    struct RecordingHelp {
        calls: Cell<usize>,
    }

    impl HelpSink for RecordingHelp {
        fn command_help(&self, _command: &dyn Invocable) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn command(seen: Arc<Mutex<Vec<Params>>>) -> Command<Params> {
        Command::new("run", "Run something")
            .unwrap()
            .handler(move |p: Params| {
                seen.lock().unwrap().push(p);
                7
            })
            .parameter(
                Parameter::<String>::new("name", "").unwrap().alias("n").unwrap(),
                |r: &mut Params, v| r.name = v,
            )
            .unwrap()
            .parameter(Parameter::<i32>::new("count", "").unwrap(), |r: &mut Params, v| {
                r.count = v
            })
            .unwrap()
            .parameter(
                Parameter::<bool>::new("verbose", "")
                    .unwrap()
                    .alias("v")
                    .unwrap()
                    .optional(false),
                |r: &mut Params, v| r.verbose = v,
            )
            .unwrap()
    }

    #[test]
    fn given_all_pairs_when_invoking_then_handler_gets_bound_record() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command(seen.clone());

        let code = cmd
            .invoke(&args(&["-n", "x", "--count", "3", "-V", "yes"]), &RecordingHelp::default())
            .unwrap();

        assert_eq!(code, 7);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [Params {
                name: "x".into(),
                count: 3,
                verbose: true
            }]
        );
    }

    #[test]
    fn given_odd_tokens_when_invoking_then_mismatch_before_lookup() {
        let cmd = command(Arc::default());
        let err = cmd
            .invoke(&args(&["--unknown", "1", "--name"]), &RecordingHelp::default())
            .unwrap_err();
        assert!(matches!(err, InvocationError::Mismatch { count: 3 }));
    }

    #[test]
    fn given_bare_token_when_invoking_then_unknown_parameter() {
        let cmd = command(Arc::default());
        let err = cmd
            .invoke(&args(&["name", "x"]), &RecordingHelp::default())
            .unwrap_err();
        assert!(matches!(err, InvocationError::UnknownParameter(_)));
    }

    #[test]
    fn given_repeated_key_when_invoking_then_repeated_error_and_no_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command(seen.clone());
        let err = cmd
            .invoke(
                &args(&["--name", "a", "--count", "1", "-n", "a"]),
                &RecordingHelp::default(),
            )
            .unwrap_err();
        assert!(matches!(err, InvocationError::RepeatedParameter { .. }));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn given_repeated_key_with_malformed_value_when_invoking_then_repeated_not_format() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command(seen.clone());
        let err = cmd
            .invoke(
                &args(&["--name", "a", "--count", "1", "--count", "abc"]),
                &RecordingHelp::default(),
            )
            .unwrap_err();
        match err {
            InvocationError::RepeatedParameter { parameter, value } => {
                assert_eq!(parameter, "count");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn given_missing_required_when_invoking_then_error() {
        let cmd = command(Arc::default());
        let err = cmd
            .invoke(&args(&["--name", "a"]), &RecordingHelp::default())
            .unwrap_err();
        match err {
            InvocationError::MissingRequiredParameter(name) => assert_eq!(name, "count"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn given_help_flag_when_invoking_then_help_and_zero() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command(seen.clone());
        let help = RecordingHelp::default();

        assert_eq!(cmd.invoke(&args(&["--HELP"]), &help).unwrap(), 0);
        assert_eq!(cmd.invoke(&args(&["-h"]), &help).unwrap(), 0);

        assert_eq!(help.calls.get(), 2);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn given_same_command_when_invoked_twice_then_no_stale_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command(seen.clone());
        let tokens = args(&["--name", "a", "--count", "1"]);

        cmd.invoke(&tokens, &RecordingHelp::default()).unwrap();
        cmd.invoke(&tokens, &RecordingHelp::default()).unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn given_duplicate_name_when_registering_then_spec_error() {
        let result = Command::<Params>::new("c", "")
            .unwrap()
            .parameter(Parameter::<i32>::new("count", "").unwrap(), |r: &mut Params, v| {
                r.count = v
            })
            .unwrap()
            .parameter(Parameter::<i32>::new("Count", "").unwrap(), |r: &mut Params, v| {
                r.count = v
            });
        assert!(matches!(result, Err(SpecError::DuplicateParameter { .. })));
    }

    #[test]
    fn given_duplicate_alias_when_registering_then_spec_error() {
        let result = Command::<Params>::new("c", "")
            .unwrap()
            .parameter(
                Parameter::<String>::new("name", "").unwrap().alias("x").unwrap(),
                |r: &mut Params, v| r.name = v,
            )
            .unwrap()
            .parameter(
                Parameter::<i32>::new("count", "").unwrap().alias("X").unwrap(),
                |r: &mut Params, v| r.count = v,
            );
        assert!(matches!(result, Err(SpecError::DuplicateAlias { .. })));
    }

    #[test]
    fn given_alias_repeated_on_one_parameter_when_registering_then_spec_error() {
        let result = Command::<Params>::new("c", "").unwrap().parameter(
            Parameter::<String>::new("name", "")
                .unwrap()
                .alias("n")
                .unwrap()
                .alias("n")
                .unwrap(),
            |r: &mut Params, v| r.name = v,
        );
        assert!(matches!(result, Err(SpecError::DuplicateAlias { .. })));
    }

    #[test]
    fn given_no_handler_when_invoking_then_missing_handler() {
        let cmd = Command::<Params>::implicit("");
        assert!(!cmd.has_handler());
        assert_eq!(cmd.name(), IMPLICIT_NAME);
        let err = cmd.invoke(&[], &RecordingHelp::default()).unwrap_err();
        assert!(matches!(err, InvocationError::MissingHandler(_)));
    }

    #[test]
    fn given_mismatched_stored_type_when_binding_then_bind_error() {
        let binding = Binding::<Params, i32> {
            parameter: Parameter::<i32>::new("count", "").unwrap(),
            setter: Arc::new(|r: &mut Params, v| r.count = v),
        };
        let mut record = Params::default();
        let err = binding
            .bind(&mut record, Some(Box::new("not an int".to_string())))
            .unwrap_err();
        match err {
            InvocationError::Bind { parameter, field } => {
                assert_eq!(parameter, "count");
                assert_eq!(field, "Count");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
