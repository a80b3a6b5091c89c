use std::{fmt, str::FromStr, time::Duration};

use crate::BoxError;

/// How the parser treats a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Consumes exactly one operand; a later occurrence overrides an earlier one.
    Plain,
    /// Satisfied by presence alone, and reachable through `--no-<name>`.
    Boolean,
    /// Accumulates every occurrence. As a positional argument it takes all
    /// remaining values.
    Aggregate,
}

type Setter<'a> = Box<dyn FnMut(&str) -> Result<(), BoxError> + 'a>;

/// A typed setting bound to a program variable.
///
/// The value holds the only reference to its variable for as long as the
/// command tree lives; the variable is written only when a parse gets as far
/// as applying values.
pub struct Value<'a> {
    kind: ValueKind,
    defaults: Vec<String>,
    set: Setter<'a>,
}

impl<'a> Value<'a> {
    pub fn new(kind: ValueKind, set: impl FnMut(&str) -> Result<(), BoxError> + 'a) -> Value<'a> {
        Value { kind, defaults: Vec::new(), set: Box::new(set) }
    }

    pub fn string(v: &'a mut String) -> Value<'a> {
        Value::new(ValueKind::Plain, move |s| {
            *v = s.to_string();
            Ok(())
        })
    }

    pub fn strings(v: &'a mut Vec<String>) -> Value<'a> {
        Value::new(ValueKind::Aggregate, move |s| {
            v.push(s.to_string());
            Ok(())
        })
    }

    pub fn bool(v: &'a mut bool) -> Value<'a> {
        Value::new(ValueKind::Boolean, move |s| {
            *v = parse_bool(s)?;
            Ok(())
        })
    }

    /// Stores the opposite of what it parses, for an explicit `--no-<name>`
    /// flag sharing a variable with a [`Value::bool`].
    pub fn negated_bool(v: &'a mut bool) -> Value<'a> {
        Value::new(ValueKind::Boolean, move |s| {
            *v = !parse_bool(s)?;
            Ok(())
        })
    }

    pub fn parse<T>(v: &'a mut T) -> Value<'a>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        Value::new(ValueKind::Plain, move |s| {
            *v = s.parse::<T>().map_err(|err| err.to_string())?;
            Ok(())
        })
    }

    /// A span of time with units, such as `1h 30m`, `90s` or `250ms`.
    pub fn duration(v: &'a mut Duration) -> Value<'a> {
        Value::new(ValueKind::Plain, move |s| {
            *v = humantime::parse_duration(s)?;
            Ok(())
        })
    }

    pub fn list<T>(v: &'a mut Vec<T>) -> Value<'a>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        Value::new(ValueKind::Aggregate, move |s| {
            v.push(s.parse::<T>().map_err(|err| err.to_string())?);
            Ok(())
        })
    }

    /// Adds fallback strings applied when nothing on the command line
    /// reached this value.
    ///
    /// # Panics
    ///
    /// If more than one default is given for a value that is not aggregate.
    pub fn default<I>(mut self, defaults: I) -> Value<'a>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.defaults.extend(defaults.into_iter().map(Into::into));
        assert!(
            self.defaults.len() <= 1 || self.is_aggregate(),
            "only aggregate values may have multiple defaults"
        );
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_boolean(&self) -> bool {
        self.kind == ValueKind::Boolean
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == ValueKind::Aggregate
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn set(&mut self, raw: &str) -> Result<(), BoxError> {
        (self.set)(raw)
    }

    /// Sets every default in order, stopping at the first failure. Returns
    /// the default that failed alongside its error.
    pub(crate) fn apply_defaults(&mut self) -> Result<(), (String, BoxError)> {
        for default in &self.defaults {
            (self.set)(default).map_err(|err| (default.clone(), err))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("kind", &self.kind).field("defaults", &self.defaults).finish()
    }
}

fn parse_bool(s: &str) -> Result<bool, BoxError> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("expected a boolean, got {s:?}").into()),
    }
}
