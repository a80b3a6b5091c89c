//! Resolution of tokens against the command tree, followed by value
//! application.
//!
//! Parsing runs in three steps. The resolver walks the token stream and
//! records which flag or argument each value belongs to, descending into
//! subcommands as it meets them. Pre-actions of everything it met then run,
//! even if resolution failed. Finally the recorded values are set, and
//! defaults and required checks are applied along the resolved command's
//! ancestry.
use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::{
    command::{Arg, Command, Context, Flag},
    scan::{Scanner, Token},
    value::Value,
    Error, Result,
};

/// A flag or argument: the depth of the command declaring it within the
/// resolved path, and its index among that command's flags or arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot {
    depth: usize,
    idx: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Entity {
    Command(usize),
    Flag(Slot),
    Arg(Slot),
}

#[derive(Debug)]
struct Resolution {
    entity: Entity,
    /// How the entity was named on the command line, for error messages.
    name: String,
    /// `None` for marker flags, which carry no value.
    value: Option<String>,
}

/// What is reachable from the current command.
///
/// Rebuilt from scratch on every subcommand switch. Flags of a descendant
/// replace same-named flags of its ancestors.
#[derive(Default)]
struct View<'c> {
    commands: HashMap<&'c str, usize>,
    long: HashMap<&'c str, Slot>,
    short: HashMap<char, Slot>,
    /// Arguments still waiting for a value. An aggregate argument stays at
    /// the front once reached.
    args: VecDeque<Slot>,
}

impl<'c> View<'c> {
    fn new(root: &'c Command<'_>, path: &[usize]) -> View<'c> {
        let mut view = View::default();
        for depth in 0..=path.len() {
            let cmd = root.at(&path[..depth]);
            for (idx, flag) in cmd.flags.iter().enumerate() {
                let slot = Slot { depth, idx };
                if let Some(long) = &flag.long {
                    view.long.insert(long.as_str(), slot);
                }
                if let Some(short) = flag.short {
                    view.short.insert(short, slot);
                }
            }
        }

        let cmd = root.at(path);
        view.commands =
            cmd.commands.iter().enumerate().map(|(idx, it)| (it.name.as_str(), idx)).collect();
        view.args = (0..cmd.args.len()).map(|idx| Slot { depth: path.len(), idx }).collect();
        view
    }

    /// Flags that at least one name still resolves to.
    fn flag_slots(&self) -> HashSet<Slot> {
        self.long.values().chain(self.short.values()).copied().collect()
    }
}

/// A flag reachable from a command, with the names that still resolve to it.
pub(crate) struct Reachable<'c, 'a> {
    pub(crate) flag: &'c Flag<'a>,
    pub(crate) long: Option<&'c str>,
    pub(crate) short: Option<char>,
}

/// Flags of the command at `path` and its ancestors, root first, leaving out
/// those whose every name is taken over by a descendant's flag.
pub(crate) fn reachable_flags<'c, 'a>(
    root: &'c Command<'a>,
    path: &[usize],
) -> Vec<Reachable<'c, 'a>> {
    let view = View::new(root, path);
    let mut res = Vec::new();
    for depth in 0..=path.len() {
        for (idx, flag) in root.at(&path[..depth]).flags.iter().enumerate() {
            let slot = Slot { depth, idx };
            let long = flag.long.as_deref().filter(|&it| view.long.get(it) == Some(&slot));
            let short = flag.short.filter(|it| view.short.get(it) == Some(&slot));
            if long.is_some() || short.is_some() {
                res.push(Reachable { flag, long, short });
            }
        }
    }
    res
}

struct Parser<'c, 'a> {
    root: &'c Command<'a>,
    scanner: Scanner,
    path: Vec<usize>,
    view: View<'c>,
    resolved: Vec<Resolution>,
    /// Every entity met, in order of first appearance.
    encountered: Vec<Entity>,
    /// Positional values matched against arguments.
    values: Vec<String>,
}

pub(crate) struct Parsed {
    pub(crate) path: Vec<usize>,
    pub(crate) values: Vec<String>,
}

pub(crate) fn parse(root: &mut Command<'_>, args: Vec<String>) -> Result<Parsed> {
    let (res, path, values, resolved, encountered) = {
        let mut p = Parser::new(root, args);
        let res = p.run();
        (res, p.path, p.values, p.resolved, p.encountered)
    };

    // Pre-actions run even when resolution failed, so that `--help` works
    // next to a bad flag. Their errors take priority.
    invoke_pre_actions(root, &path, &values, &encountered)?;
    res?;

    apply(root, &path, resolved)?;
    Ok(Parsed { path, values })
}

impl<'c, 'a> Parser<'c, 'a> {
    fn new(root: &'c Command<'a>, args: Vec<String>) -> Parser<'c, 'a> {
        Parser {
            root,
            scanner: Scanner::new(args),
            path: Vec::new(),
            view: View::new(root, &[]),
            resolved: Vec::new(),
            encountered: vec![Entity::Command(0)],
            values: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        let mut verbatim = false;
        loop {
            let token = self.scanner.next(verbatim);
            trace!(?token, "scanned");
            match token {
                Token::Eof => return Ok(()),
                Token::Verbatim => verbatim = true,
                Token::Long(name) => self.long(name)?,
                Token::Short(c) => self.short(c)?,
                Token::Value(value) | Token::Assigned(value) => self.positional(value)?,
            }
        }
    }

    fn long(&mut self, name: String) -> Result<()> {
        let token = Token::Long(name).to_string();
        let name = &token[2..];
        let (slot, negated) = match self.view.long.get(name) {
            Some(&slot) => (slot, false),
            None => match name.strip_prefix("no-").and_then(|it| self.view.long.get(it)) {
                Some(&slot) => (slot, true),
                None => return Err(Error::UnknownFlag(token)),
            },
        };
        let flag = self.flag(slot);
        if negated && !flag.is_boolean() {
            return Err(Error::UnknownFlag(token));
        }

        let value = match (&flag.value, self.scanner.next_assigned()) {
            (None, Some(_)) => return Err(Error::ValueNotAccepted(token)),
            (Some(_), Some(_)) if negated => return Err(Error::ValueNotAccepted(token)),
            (Some(_), Some(value)) => Some(value),
            (Some(value), None) if value.is_boolean() => Some((!negated).to_string()),
            (Some(_), None) => Some(self.operand(&token)?),
            (None, None) => None,
        };
        self.resolve(Entity::Flag(slot), token, value);
        Ok(())
    }

    fn short(&mut self, c: char) -> Result<()> {
        let token = Token::Short(c).to_string();
        let slot = match self.view.short.get(&c) {
            Some(&slot) => slot,
            None => return Err(Error::UnknownFlag(token)),
        };

        let value = match &self.flag(slot).value {
            Some(value) if value.is_boolean() => Some("true".to_string()),
            Some(_) => Some(self.operand(&token)?),
            None => None,
        };
        self.resolve(Entity::Flag(slot), token, value);
        Ok(())
    }

    fn positional(&mut self, value: String) -> Result<()> {
        // Commands take precedence over positional arguments.
        if !self.view.commands.is_empty() {
            let idx = match self.view.commands.get(value.as_str()) {
                Some(&idx) => idx,
                None => {
                    let ctx = Context::new(self.root, self.path.clone());
                    return Err(Error::UnknownCommand(format!("{} {value}", ctx.full_name())));
                }
            };
            self.path.push(idx);
            self.view = View::new(self.root, &self.path);
            self.encounter(Entity::Command(self.path.len()));
            debug!(command = %value, depth = self.path.len(), "entered subcommand");
            return Ok(());
        }

        let slot = match self.view.args.front() {
            Some(&slot) => slot,
            None => return Err(Error::UnexpectedArg(value)),
        };
        let arg = self.arg(slot);
        if !arg.is_aggregate() {
            self.view.args.pop_front();
        }
        self.values.push(value.clone());
        self.resolve(Entity::Arg(slot), arg.name.clone(), Some(value));
        Ok(())
    }

    /// Takes the next raw string as the operand of `flag`, whatever it looks
    /// like.
    fn operand(&mut self, flag: &str) -> Result<String> {
        match self.scanner.next(true) {
            Token::Value(value) | Token::Assigned(value) => Ok(value),
            _ => Err(Error::MissingValue(flag.to_string())),
        }
    }

    fn resolve(&mut self, entity: Entity, name: String, value: Option<String>) {
        trace!(name = %name, value = ?value, "resolved");
        self.encounter(entity);
        self.resolved.push(Resolution { entity, name, value });
    }

    fn encounter(&mut self, entity: Entity) {
        if !self.encountered.contains(&entity) {
            self.encountered.push(entity);
        }
    }

    fn flag(&self, slot: Slot) -> &'c Flag<'a> {
        &self.root.at(&self.path[..slot.depth]).flags[slot.idx]
    }

    fn arg(&self, slot: Slot) -> &'c Arg<'a> {
        &self.root.at(&self.path[..slot.depth]).args[slot.idx]
    }
}

fn invoke_pre_actions(
    root: &Command<'_>,
    path: &[usize],
    values: &[String],
    encountered: &[Entity],
) -> Result<()> {
    let mut ctx = Context::new(root, path.to_vec());
    ctx.values = values.to_vec();
    for &entity in encountered {
        let action = match entity {
            Entity::Command(depth) => root.at(&path[..depth]).pre_action.as_ref(),
            Entity::Flag(slot) => root.at(&path[..slot.depth]).flags[slot.idx].pre_action.as_ref(),
            Entity::Arg(slot) => root.at(&path[..slot.depth]).args[slot.idx].pre_action.as_ref(),
        };
        if let Some(action) = action {
            debug!(?entity, "running pre-action");
            action(&ctx).map_err(Error::from_action)?;
        }
    }
    Ok(())
}

/// Sets resolved values in encounter order, then walks the resolved path from
/// the root applying defaults and required checks to everything left unset.
///
/// Flags that no name reaches from the resolved command could not have been
/// given, so they are neither required nor defaulted.
fn apply(root: &mut Command<'_>, path: &[usize], resolved: Vec<Resolution>) -> Result<()> {
    let live = View::new(root, path).flag_slots();
    let mut seen = HashSet::new();
    for Resolution { entity, name, value } in resolved {
        seen.insert(entity);
        let (Some(value), Some(target)) = (value, value_mut(root, path, entity)) else {
            continue;
        };
        target.set(&value).map_err(|err| Error::invalid_value(&name, &value, err))?;
    }

    for depth in 0..=path.len() {
        let cmd = root.at_mut(&path[..depth]);
        for (idx, flag) in cmd.flags.iter_mut().enumerate() {
            let slot = Slot { depth, idx };
            if seen.contains(&Entity::Flag(slot)) || !live.contains(&slot) {
                continue;
            }
            let name = flag.to_string();
            if flag.required {
                return Err(Error::MissingFlag(name));
            }
            if let Some(value) = flag.value.as_mut() {
                apply_defaults(&name, value)?;
            }
        }

        for (idx, arg) in cmd.args.iter_mut().enumerate() {
            if seen.contains(&Entity::Arg(Slot { depth, idx })) {
                continue;
            }
            if arg.required {
                return Err(Error::MissingArg(arg.name.clone()));
            }
            if let Some(value) = arg.value.as_mut() {
                apply_defaults(&arg.name, value)?;
            }
        }
    }
    Ok(())
}

fn apply_defaults(name: &str, value: &mut Value<'_>) -> Result<()> {
    if value.defaults().is_empty() {
        return Ok(());
    }
    debug!(name, defaults = ?value.defaults(), "applying defaults");
    value.apply_defaults().map_err(|(default, err)| Error::invalid_value(name, &default, err))
}

fn value_mut<'r, 'a>(
    root: &'r mut Command<'a>,
    path: &[usize],
    entity: Entity,
) -> Option<&'r mut Value<'a>> {
    match entity {
        Entity::Command(_) => None,
        Entity::Flag(slot) => root.at_mut(&path[..slot.depth]).flags[slot.idx].value.as_mut(),
        Entity::Arg(slot) => root.at_mut(&path[..slot.depth]).args[slot.idx].value.as_mut(),
    }
}
