//! Parameter descriptors: one named, optionally-aliased, typed input slot.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use tracing::trace;

use crate::domain::error::{BoxError, CallbackPanic, InvocationError, SpecError, ValueError};
use crate::domain::names;
use crate::domain::value::ArgValue;

/// Custom coercion replacing the built-in one for a parameter.
pub type Factory<T> = Arc<dyn Fn(&str) -> Result<T, BoxError> + Send + Sync>;

/// Predicate applied after coercion; `Ok(false)` rejects the value.
pub type Validator<T> = Arc<dyn Fn(&T) -> Result<bool, BoxError> + Send + Sync>;

/// Renders a default value for usage text.
pub type Label<T> = fn(&T) -> String;

/// How a raw token becomes a `T`.
enum Coercion<T> {
    /// Built-in scalar or enumeration coercion.
    Value(fn(&str) -> Result<T, ValueError>),
    /// `FromStr` on a custom type.
    FromStr(fn(&str) -> Result<T, BoxError>),
    Factory(Factory<T>),
}

/// Read-only view of a registered parameter.
pub trait ParameterInfo {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn aliases(&self) -> &[String];
    fn target_field(&self) -> &str;
    fn type_name(&self) -> &str;
    fn is_optional(&self) -> bool;
    /// Rendered default, present for optional parameters whose type has a label.
    fn default_label(&self) -> Option<String>;
}

/// Registered definition of one typed parameter.
///
/// Descriptors are immutable once added to a command; everything that happens
/// during an invocation lives in the command's invocation context.
pub struct Parameter<T> {
    name: String,
    description: String,
    aliases: Vec<String>,
    target_field: String,
    type_name: &'static str,
    default: Option<T>,
    label: Option<Label<T>>,
    coercion: Coercion<T>,
    validator: Option<Validator<T>>,
}

impl<T: ArgValue> Parameter<T> {
    /// Declare a parameter using the built-in coercion of `T`.
    pub fn new(name: &str, description: &str) -> Result<Self, SpecError> {
        let mut parameter =
            Self::build(name, description, T::TYPE_NAME, Coercion::Value(T::parse_arg))?;
        parameter.label = Some(T::label);
        Ok(parameter)
    }
}

impl<T> Parameter<T>
where
    T: FromStr + Clone + Send + Sync + 'static,
    T::Err: Into<BoxError>,
{
    /// Declare a parameter of a custom type coerced through its `FromStr` impl.
    pub fn from_str_type(name: &str, description: &str) -> Result<Self, SpecError> {
        Self::build(
            name,
            description,
            short_type_name::<T>(),
            Coercion::FromStr(|raw| T::from_str(raw).map_err(Into::into)),
        )
    }
}

impl<T> Parameter<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Declare a parameter of any type, coerced by `factory` only.
    pub fn with_factory<F, E>(name: &str, description: &str, factory: F) -> Result<Self, SpecError>
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::build(
            name,
            description,
            short_type_name::<T>(),
            Coercion::Factory(wrap_factory(factory)),
        )
    }

    fn build(
        name: &str,
        description: &str,
        type_name: &'static str,
        coercion: Coercion<T>,
    ) -> Result<Self, SpecError> {
        let name = names::parameter_name(name)?;
        let target_field = names::target_field(&name);
        Ok(Self {
            name,
            description: description.to_string(),
            aliases: Vec::new(),
            target_field,
            type_name,
            default: None,
            label: None,
            coercion,
            validator: None,
        })
    }

    /// Add a short alternate key, used as `-<alias>`.
    pub fn alias(mut self, alias: &str) -> Result<Self, SpecError> {
        let alias = names::alias(&self.name, alias)?;
        self.aliases.push(alias);
        Ok(self)
    }

    /// Make the parameter optional; `default` is bound when it is not supplied.
    pub fn optional(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    /// Show the default in usage text through `Display`.
    pub fn display_default(mut self) -> Self
    where
        T: fmt::Display,
    {
        self.label = Some(|value: &T| value.to_string());
        self
    }

    /// Replace the coercion of this parameter with `factory`.
    pub fn factory<F, E>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.coercion = Coercion::Factory(wrap_factory(factory));
        self
    }

    /// Reject coerced values for which `predicate` returns false.
    pub fn validate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(move |value: &T| Ok(predicate(value))));
        self
    }

    /// Like [`validate`](Self::validate), for predicates that can fail.
    pub fn try_validate<F, E>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.validator = Some(Arc::new(move |value: &T| predicate(value).map_err(Into::into)));
        self
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Coerce one raw token.
    pub fn parse(&self, raw: &str) -> Result<T, InvocationError> {
        trace!(parameter = %self.name, raw, "parse");
        match &self.coercion {
            Coercion::Value(parse) => parse(raw).map_err(|e| InvocationError::Format {
                parameter: self.name.clone(),
                value: raw.to_string(),
                source: Box::new(e),
            }),
            Coercion::FromStr(parse) => parse(raw).map_err(|source| InvocationError::Format {
                parameter: self.name.clone(),
                value: raw.to_string(),
                source,
            }),
            Coercion::Factory(factory) => {
                factory(raw).map_err(|source| InvocationError::Factory {
                    parameter: self.name.clone(),
                    value: raw.to_string(),
                    source,
                })
            }
        }
    }

    /// Run the registered predicate, if any, against a coerced value.
    pub fn check(&self, value: &T, raw: &str) -> Result<(), InvocationError> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| validator(value))).unwrap_or_else(|payload| {
            Err(Box::new(CallbackPanic::from_payload(payload)) as BoxError)
        });
        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => Err(InvocationError::Validation {
                parameter: self.name.clone(),
                value: raw.to_string(),
                source: None,
            }),
            Err(source) => Err(InvocationError::Validation {
                parameter: self.name.clone(),
                value: raw.to_string(),
                source: Some(source),
            }),
        }
    }
}

impl<T> ParameterInfo for Parameter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn target_field(&self) -> &str {
        &self.target_field
    }

    fn type_name(&self) -> &str {
        self.type_name
    }

    fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    fn default_label(&self) -> Option<String> {
        let label = self.label?;
        self.default.as_ref().map(label)
    }
}

impl<T> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("type_name", &self.type_name)
            .field("default", &self.default_label())
            .finish_non_exhaustive()
    }
}

/// Box a user factory, turning its errors and panics into `BoxError`.
fn wrap_factory<T, F, E>(factory: F) -> Factory<T>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    Arc::new(move |raw: &str| {
        catch_unwind(AssertUnwindSafe(|| factory(raw).map_err(Into::into)))
            .unwrap_or_else(|payload| Err(Box::new(CallbackPanic::from_payload(payload)) as BoxError))
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
