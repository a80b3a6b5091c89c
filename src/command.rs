use std::{collections::BTreeMap, fmt};

use crate::{parse, value::Value, BoxError, Error, Result};

/// Callback invoked with the command a parse resolved to.
pub type Action<'a> = Box<dyn Fn(&Context<'_, 'a>) -> Result<(), BoxError> + 'a>;

/// A node in the command tree.
///
/// The root of the tree is the program itself. A command with children
/// dispatches on its first positional value; a command without children
/// matches positional values against its own [`Arg`]s.
pub struct Command<'a> {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) hidden: bool,
    pub(crate) labels: BTreeMap<String, String>,
    pub(crate) pre_action: Option<Action<'a>>,
    pub(crate) action: Option<Action<'a>>,
    pub(crate) commands: Vec<Command<'a>>,
    pub(crate) flags: Vec<Flag<'a>>,
    pub(crate) args: Vec<Arg<'a>>,
}

impl<'a> Command<'a> {
    pub fn new(name: impl Into<String>) -> Command<'a> {
        let name = name.into();
        assert!(!name.is_empty(), "commands must have a name");
        Command {
            name,
            help: String::new(),
            hidden: false,
            labels: BTreeMap::new(),
            pre_action: None,
            action: None,
            commands: Vec::new(),
            flags: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Command<'a> {
        self.help = help.into();
        self
    }

    pub fn hidden(mut self) -> Command<'a> {
        self.hidden = true;
        self
    }

    /// Attaches a free-form label, for programs that group or filter their
    /// commands. The parser ignores labels.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Command<'a> {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Runs after parsing stops but before any value is set, whenever this
    /// command was reached.
    pub fn pre_action(
        mut self,
        f: impl Fn(&Context<'_, 'a>) -> Result<(), BoxError> + 'a,
    ) -> Command<'a> {
        self.pre_action = Some(Box::new(f));
        self
    }

    /// Runs from [`Command::run`] when this command is the one resolved.
    pub fn action(
        mut self,
        f: impl Fn(&Context<'_, 'a>) -> Result<(), BoxError> + 'a,
    ) -> Command<'a> {
        self.action = Some(Box::new(f));
        self
    }

    pub fn subcommand(mut self, command: Command<'a>) -> Command<'a> {
        self.commands.push(command);
        self
    }

    /// Adds a flag, visible to this command and every descendant.
    pub fn flag(mut self, flag: Flag<'a>) -> Command<'a> {
        self.flags.push(flag);
        self
    }

    /// Adds a positional argument.
    ///
    /// # Panics
    ///
    /// If an aggregate argument was already added: it takes every remaining
    /// value, so it has to come last.
    pub fn arg(mut self, arg: Arg<'a>) -> Command<'a> {
        if let Some(last) = self.args.last() {
            assert!(
                !last.is_aggregate(),
                "argument `{}` follows aggregate argument `{}`",
                arg.name,
                last.name
            );
        }
        self.args.push(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn get_label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn commands(&self) -> &[Command<'a>] {
        &self.commands
    }

    /// Flags declared on this command, not including inherited ones.
    pub fn flags(&self) -> &[Flag<'a>] {
        &self.flags
    }

    pub fn args(&self) -> &[Arg<'a>] {
        &self.args
    }

    /// Parses `args` and sets every value they reach, then applies defaults
    /// and checks required flags and arguments along the resolved command's
    /// ancestry.
    ///
    /// Values are not rolled back on failure: anything set before the error
    /// stays set.
    pub fn parse<I>(&mut self, args: I) -> Result<Context<'_, 'a>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let parsed = parse::parse(self, args.into_iter().map(Into::into).collect())?;
        Ok(Context { root: self, path: parsed.path, values: parsed.values })
    }

    /// Parses `args` and invokes the action of the resolved command.
    pub fn run<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let ctx = self.parse(args)?;
        ctx.invoke()
    }

    /// Parses the arguments of the current process, skipping the program
    /// name.
    pub fn parse_from_env(&mut self) -> Result<Context<'_, 'a>> {
        let args = env_args()?;
        self.parse(args)
    }

    pub fn run_from_env(&mut self) -> Result<()> {
        let args = env_args()?;
        self.run(args)
    }

    pub(crate) fn at(&self, path: &[usize]) -> &Command<'a> {
        path.iter().fold(self, |cmd, &idx| &cmd.commands[idx])
    }

    pub(crate) fn at_mut(&mut self, path: &[usize]) -> &mut Command<'a> {
        path.iter().fold(self, |cmd, &idx| &mut cmd.commands[idx])
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("commands", &self.commands)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

fn env_args() -> Result<Vec<String>> {
    std::env::args_os().skip(1).map(|arg| arg.into_string().map_err(Error::NotUnicode)).collect()
}

/// A named option.
///
/// A flag without a [`Value`] is a marker: it takes no operand and only
/// records that it was present.
pub struct Flag<'a> {
    pub(crate) long: Option<String>,
    pub(crate) short: Option<char>,
    pub(crate) help: String,
    pub(crate) placeholder: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) required: bool,
    pub(crate) pre_action: Option<Action<'a>>,
    pub(crate) value: Option<Value<'a>>,
}

impl<'a> Flag<'a> {
    /// A flag matched by `--<long>`.
    pub fn new(long: impl Into<String>) -> Flag<'a> {
        let long = long.into();
        assert!(!long.is_empty(), "flags may not be anonymous");
        Flag::build(Some(long), None)
    }

    /// A flag matched only by `-<short>`.
    pub fn short_only(short: char) -> Flag<'a> {
        Flag::build(None, Some(short))
    }

    fn build(long: Option<String>, short: Option<char>) -> Flag<'a> {
        Flag {
            long,
            short,
            help: String::new(),
            placeholder: None,
            hidden: false,
            required: false,
            pre_action: None,
            value: None,
        }
    }

    pub fn short(mut self, short: char) -> Flag<'a> {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Flag<'a> {
        self.help = help.into();
        self
    }

    /// Name shown for the operand in usage text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Flag<'a> {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn hidden(mut self) -> Flag<'a> {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Flag<'a> {
        self.required = true;
        self
    }

    pub fn pre_action(
        mut self,
        f: impl Fn(&Context<'_, 'a>) -> Result<(), BoxError> + 'a,
    ) -> Flag<'a> {
        self.pre_action = Some(Box::new(f));
        self
    }

    pub fn value(mut self, value: Value<'a>) -> Flag<'a> {
        self.value = Some(value);
        self
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_value(&self) -> Option<&Value<'a>> {
        self.value.as_ref()
    }

    pub fn is_boolean(&self) -> bool {
        self.value.as_ref().map_or(false, Value::is_boolean)
    }

    pub fn is_aggregate(&self) -> bool {
        self.value.as_ref().map_or(false, Value::is_aggregate)
    }
}

/// Formats the way the flag is spelled in messages, preferring the long form.
impl fmt::Display for Flag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.long, self.short) {
            (Some(long), _) => write!(f, "--{long}"),
            (None, Some(short)) => write!(f, "-{short}"),
            (None, None) => f.write_str("<anonymous>"),
        }
    }
}

impl fmt::Debug for Flag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("long", &self.long)
            .field("short", &self.short)
            .field("required", &self.required)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A positional argument.
pub struct Arg<'a> {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) required: bool,
    pub(crate) pre_action: Option<Action<'a>>,
    pub(crate) value: Option<Value<'a>>,
}

impl<'a> Arg<'a> {
    pub fn new(name: impl Into<String>) -> Arg<'a> {
        let name = name.into();
        Arg { name, help: String::new(), required: false, pre_action: None, value: None }
    }

    pub fn help(mut self, help: impl Into<String>) -> Arg<'a> {
        self.help = help.into();
        self
    }

    pub fn required(mut self) -> Arg<'a> {
        self.required = true;
        self
    }

    pub fn pre_action(
        mut self,
        f: impl Fn(&Context<'_, 'a>) -> Result<(), BoxError> + 'a,
    ) -> Arg<'a> {
        self.pre_action = Some(Box::new(f));
        self
    }

    pub fn value(mut self, value: Value<'a>) -> Arg<'a> {
        self.value = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_value(&self) -> Option<&Value<'a>> {
        self.value.as_ref()
    }

    pub fn is_aggregate(&self) -> bool {
        self.value.as_ref().map_or(false, Value::is_aggregate)
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A command within its tree: the root plus the path of child indices
/// leading to it.
#[derive(Clone)]
pub struct Context<'c, 'a> {
    pub(crate) root: &'c Command<'a>,
    pub(crate) path: Vec<usize>,
    pub(crate) values: Vec<String>,
}

impl<'c, 'a> Context<'c, 'a> {
    pub(crate) fn new(root: &'c Command<'a>, path: Vec<usize>) -> Context<'c, 'a> {
        Context { root, path, values: Vec::new() }
    }

    pub fn root(&self) -> &'c Command<'a> {
        self.root
    }

    pub fn command(&self) -> &'c Command<'a> {
        self.root.at(&self.path)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn parent(&self) -> Option<Context<'c, 'a>> {
        let (_, parent) = self.path.split_last()?;
        Some(Context::new(self.root, parent.to_vec()))
    }

    /// The command followed by a child with the given name.
    pub fn child(&self, name: &str) -> Option<Context<'c, 'a>> {
        let idx = self.command().commands.iter().position(|cmd| cmd.name == name)?;
        let mut path = self.path.clone();
        path.push(idx);
        Some(Context::new(self.root, path))
    }

    /// Commands from the root down to and including this one.
    pub fn ancestors(&self) -> impl Iterator<Item = &'c Command<'a>> + '_ {
        let root = self.root;
        (0..=self.path.len()).map(move |depth| root.at(&self.path[..depth]))
    }

    /// Space separated names from the root to this command.
    pub fn full_name(&self) -> String {
        self.ancestors().map(|cmd| cmd.name.as_str()).collect::<Vec<_>>().join(" ")
    }

    /// Flags visible from this command: its own and every ancestor's, root
    /// first.
    pub fn flags(&self) -> impl Iterator<Item = &'c Flag<'a>> + '_ {
        self.ancestors().flat_map(|cmd| cmd.flags.iter())
    }

    /// Raw positional values matched against this command's arguments, in
    /// the order they appeared.
    pub fn args(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn invoke(&self) -> Result<()> {
        match &self.command().action {
            Some(action) => action(self).map_err(Error::from_action),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Context<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.full_name())
            .field("args", &self.values)
            .finish()
    }
}
