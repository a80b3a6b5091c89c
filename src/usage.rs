//! Usage text, and the standard `--help` flag and `help` command built on it.
use std::fmt::Write;

use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

use crate::{
    command::{Arg, Command, Context, Flag},
    parse::{reachable_flags, Reachable},
    value::{Value, ValueKind},
    Error,
};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

/// Renders usage text for a command.
#[derive(Debug, Clone)]
pub struct UsageWriter {
    /// Prefix for the rows of each section.
    pub indent: String,
    /// Separator between the two columns of a section.
    pub divider: String,
    /// Widest the left column of a section may grow.
    pub max_first_column: usize,
    /// Width text is wrapped to.
    pub max_line_width: usize,
}

impl Default for UsageWriter {
    fn default() -> UsageWriter {
        UsageWriter {
            indent: "  ".to_string(),
            divider: "  ".to_string(),
            max_first_column: 35,
            max_line_width: 80,
        }
    }
}

impl UsageWriter {
    pub fn render(&self, ctx: &Context<'_, '_>) -> String {
        let command = ctx.command();

        let mut subs = command.commands().iter().filter(|it| !it.is_hidden()).collect::<Vec<_>>();
        subs.sort_by(|a, b| a.name().cmp(b.name()));

        let flags = visible_flags(ctx);
        // Positional arguments keep their declaration order.
        let args = command.args();

        let mut buf = String::new();
        w!(buf, "Usage: {}", ctx.full_name());
        if !flags.is_empty() {
            w!(buf, " [<flags>]");
        }
        if !subs.is_empty() {
            w!(buf, " {}", brackets("<command>", command.has_action()));
        } else {
            // Everything before the last required argument is required too.
            let last_required = args.iter().rposition(|it| it.is_required());
            for (i, arg) in args.iter().enumerate() {
                let dots = if arg.is_aggregate() { "..." } else { "" };
                let name = format!("<{}>{dots}", arg.name());
                w!(buf, " {}", brackets(&name, last_required.map_or(true, |last| i > last)));
            }
        }
        w!(buf, "\n");

        if !command.help_text().is_empty() {
            w!(buf, "\n");
            for line in wrap(command.help_text(), self.max_line_width) {
                w!(buf, "{line}\n");
            }
        }

        // Arguments are only listed for leaf commands: a command with
        // children never matches them.
        if !subs.is_empty() {
            w!(buf, "\nCommands:\n");
            let rows = subs
                .iter()
                .map(|cmd| (format!("{}{}", self.indent, cmd.name()), first_line(cmd.help_text())))
                .collect::<Vec<_>>();
            self.two_columns(&mut buf, &rows);
        } else if !args.is_empty() {
            w!(buf, "\nArguments:\n");
            let rows = args
                .iter()
                .map(|arg| (format!("{}{}", self.indent, arg.name()), first_line(arg.help_text())))
                .collect::<Vec<_>>();
            self.two_columns(&mut buf, &rows);
        }

        if !flags.is_empty() {
            w!(buf, "\nOptions:\n");
            let have_shorts = flags.iter().any(|it| it.short.is_some());
            let rows = flags
                .iter()
                .map(|row| {
                    let left = flag_column(row, have_shorts);
                    (format!("{}{left}", self.indent), first_line(row.flag.help_text()))
                })
                .collect::<Vec<_>>();
            self.two_columns(&mut buf, &rows);
        }

        buf
    }

    fn two_columns(&self, buf: &mut String, rows: &[(String, &str)]) {
        let left_width = rows
            .iter()
            .map(|(left, _)| left.width())
            .max()
            .unwrap_or(0)
            .min(self.max_first_column);
        let gap = left_width + self.divider.width();
        let right_width = self.max_line_width.saturating_sub(gap);

        for (left, right) in rows {
            let mut lines = wrap(right, right_width).into_iter();
            if left.width() > left_width {
                // Too wide to share a line with its description.
                w!(buf, "{left}\n");
            } else {
                let first = lines.next().unwrap_or_default();
                let pad = " ".repeat(left_width - left.width());
                let line = format!("{left}{pad}{}{first}", self.divider);
                w!(buf, "{}\n", line.trim_end());
            }
            for line in lines {
                w!(buf, "{:gap$}{line}\n", "");
            }
        }
    }
}

/// A `-h/--help` flag whose pre-action renders usage for the resolved
/// command and stops the parse with [`Error::Help`].
pub fn help_flag<'a>(writer: UsageWriter) -> Flag<'a> {
    Flag::new("help")
        .short('h')
        .help("Show usage")
        .pre_action(move |ctx| Err(Error::Help(writer.render(ctx)).into()))
}

/// A `help [command...]` command rendering usage for its parent, or for the
/// parent's descendant named by its arguments.
pub fn help_command<'a>(writer: UsageWriter) -> Command<'a> {
    Command::new("help")
        .help("Show usage")
        .arg(
            Arg::new("command")
                .help("Show help for subcommand(s).")
                .value(Value::new(ValueKind::Aggregate, |_| Ok(()))),
        )
        .pre_action(move |ctx| {
            let mut target = match ctx.parent() {
                Some(it) => it,
                None => ctx.clone(),
            };
            for name in ctx.args() {
                target = match target.child(name) {
                    Some(it) => it,
                    None => {
                        let full_name = format!("{} {name}", target.full_name());
                        return Err(Error::UnknownCommand(full_name).into());
                    }
                };
            }
            Err(Error::Help(writer.render(&target)).into())
        })
}

/// Visible flags of the command and its ancestors with the names that still
/// reach them, sorted by long name or else short name.
fn visible_flags<'c, 'a>(ctx: &Context<'c, 'a>) -> Vec<Reachable<'c, 'a>> {
    let mut res = reachable_flags(ctx.root(), &ctx.path)
        .into_iter()
        .filter(|it| !it.flag.is_hidden())
        .collect::<Vec<_>>();
    res.sort_by_key(|it| sort_key(it));
    res
}

fn sort_key(row: &Reachable<'_, '_>) -> String {
    match (row.long, row.short) {
        (Some(long), _) => long.to_string(),
        (None, Some(short)) => short.to_string(),
        (None, None) => String::new(),
    }
}

fn flag_column(row: &Reachable<'_, '_>, have_shorts: bool) -> String {
    let mut col = String::new();
    if have_shorts {
        match row.short {
            Some(short) => w!(col, "-{short}"),
            None => w!(col, "  "),
        }
        if row.long.is_some() {
            w!(col, "{}", if row.short.is_some() { ", " } else { "  " });
        }
    }
    if let Some(long) = row.long {
        w!(col, "--{long}");
    }

    let flag = row.flag;
    if flag.get_value().is_some() && !flag.is_boolean() {
        w!(col, " {}", flag.placeholder_text().unwrap_or("VALUE"));
        if flag.is_aggregate() {
            w!(col, "...");
        }
    }
    col
}

fn brackets(s: &str, optional: bool) -> String {
    if optional {
        format!("[{s}]")
    } else {
        s.to_string()
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Greedy word wrap by display width. Explicit line breaks are kept; a word
/// wider than `width` gets a line of its own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let options = Options::new(width)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(text, options).into_iter().map(|it| it.into_owned()).collect()
}
