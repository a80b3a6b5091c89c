//! A command line parser that resolves raw arguments against a tree of
//! commands.
//!
//! A program declares a root [`Command`] with [`Flag`]s, positional
//! [`Arg`]s and child commands. Each flag or argument is backed by a
//! [`Value`] which writes into a program variable when the parse succeeds:
//!
//! ```
//! use argtree::{Command, Flag, Value};
//!
//! let mut jobs = 1u32;
//! let mut verbose = false;
//! {
//!     let mut cmd = Command::new("build")
//!         .flag(Flag::new("jobs").short('j').value(Value::parse(&mut jobs)))
//!         .flag(Flag::new("verbose").short('v').value(Value::bool(&mut verbose)));
//!     cmd.parse(["-vj4"]).unwrap();
//! }
//! assert_eq!(jobs, 4);
//! assert!(verbose);
//! ```
use std::{ffi::OsString, fmt, process};

mod command;
mod parse;
mod scan;
pub mod usage;
mod value;

pub use crate::{
    command::{Action, Arg, Command, Context, Flag},
    usage::UsageWriter,
    value::{Value, ValueKind},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error returned by value setters and actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown flag: `{0}`")]
    UnknownFlag(String),
    /// Carries the fully qualified command path that was attempted.
    #[error("unknown command: `{0}`")]
    UnknownCommand(String),
    #[error("expected a value for `{0}`")]
    MissingValue(String),
    #[error("invalid value {value:?} for `{name}`: {source}")]
    InvalidValue {
        name: String,
        value: String,
        #[source]
        source: BoxError,
    },
    #[error("unexpected argument: {0:?}")]
    UnexpectedArg(String),
    #[error("missing required flag `{0}`")]
    MissingFlag(String),
    #[error("missing required argument `{0}`")]
    MissingArg(String),
    #[error("`{0}` does not accept a value")]
    ValueNotAccepted(String),
    #[error("argument is not valid unicode: {0:?}")]
    NotUnicode(OsString),
    /// Usage text produced by a help flag or command.
    #[error("{0}")]
    Help(String),
    #[error(transparent)]
    Action(BoxError),
}

impl Error {
    /// Whether this error carries help text rather than a failure.
    pub fn is_help(&self) -> bool {
        matches!(self, Error::Help(_))
    }

    /// Prints the error and terminates the process.
    ///
    /// Help is written to stdout with status 0, anything else to stderr with
    /// status 2.
    pub fn exit(self) -> ! {
        if self.is_help() {
            print!("{self}");
            process::exit(0)
        } else {
            eprintln!("{self}");
            process::exit(2)
        }
    }

    /// Unwraps errors of this crate that travelled through an action, such as
    /// [`Error::Help`].
    pub(crate) fn from_action(err: BoxError) -> Error {
        match err.downcast::<Error>() {
            Ok(err) => *err,
            Err(err) => Error::Action(err),
        }
    }

    pub(crate) fn invalid_value(name: impl fmt::Display, value: &str, source: BoxError) -> Error {
        Error::InvalidValue { name: name.to_string(), value: value.to_string(), source }
    }
}
