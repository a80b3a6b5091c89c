//! Splits raw arguments into tokens.
//!
//! Short flag clusters are taken apart one character at a time, `--name=value`
//! is split into a flag and an assigned value, and a bare `--` switches the
//! caller into verbatim mode.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Eof,
    Long(String),
    Short(char),
    Value(String),
    /// Value joined to its flag, as in `--name=value`.
    Assigned(String),
    /// The `--` separator.
    Verbatim,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("end of input"),
            Token::Long(name) => write!(f, "--{name}"),
            Token::Short(c) => write!(f, "-{c}"),
            Token::Value(value) | Token::Assigned(value) => f.write_str(value),
            Token::Verbatim => f.write_str("--"),
        }
    }
}

pub(crate) struct Scanner {
    rargs: Vec<String>,
    /// Unread tail of a short flag cluster, without the leading dash.
    remainder: Option<String>,
    /// At most one token scanned ahead of the caller.
    buffered: Option<Token>,
}

impl Scanner {
    pub(crate) fn new(mut args: Vec<String>) -> Scanner {
        args.reverse();
        Scanner { rargs: args, remainder: None, buffered: None }
    }

    /// Returns the next token.
    ///
    /// With `verbatim` set the next raw string is returned as a value without
    /// interpretation. A pending short cluster remainder counts as such a
    /// string, which is how `-j4` yields `4` for `-j`.
    pub(crate) fn next(&mut self, verbatim: bool) -> Token {
        if let Some(token) = self.buffered.take() {
            return token;
        }

        if let Some(rest) = self.remainder.take() {
            if verbatim {
                return Token::Value(rest);
            }
            return self.short(&rest);
        }

        let arg = match self.rargs.pop() {
            Some(it) => it,
            None => return Token::Eof,
        };
        if verbatim {
            return Token::Value(arg);
        }

        if arg == "--" {
            return Token::Verbatim;
        }
        if let Some(long) = arg.strip_prefix("--") {
            return match long.split_once('=') {
                Some((name, value)) => {
                    self.buffered = Some(Token::Assigned(value.to_string()));
                    Token::Long(name.to_string())
                }
                None => Token::Long(long.to_string()),
            };
        }
        match arg.strip_prefix('-') {
            Some(cluster) if !cluster.is_empty() => self.short(cluster),
            // `-` alone conventionally names stdin.
            _ => Token::Value(arg),
        }
    }

    /// Takes the value joined to the flag just returned, if there is one.
    pub(crate) fn next_assigned(&mut self) -> Option<String> {
        match self.buffered.take() {
            Some(Token::Assigned(value)) => Some(value),
            other => {
                self.buffered = other;
                None
            }
        }
    }

    fn short(&mut self, cluster: &str) -> Token {
        let mut chars = cluster.chars();
        let c = match chars.next() {
            Some(it) => it,
            None => return Token::Eof,
        };
        let rest = chars.as_str();
        if !rest.is_empty() {
            self.remainder = Some(rest.to_string());
        }
        Token::Short(c)
    }
}
