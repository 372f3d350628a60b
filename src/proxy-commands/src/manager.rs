//! Command manager: owns the command catalog and provides the execution and
//! completion entry points used by the console and scripting front ends.
//!
//! The manager does no internal locking. Registration (`collect`, `add`,
//! `remove`) takes `&mut self`, so the host serializes it against `call` and
//! `parse_partial` through ordinary borrowing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::addon::Addon;
use crate::command::Command;
use crate::config::{CollisionPolicy, CommandsConfig};
use crate::context::{CallContext, NoopContext};
use crate::definition::CommandDef;
use crate::error::{CommandError, Result};
use crate::lexer::{self, Lexer};
use crate::types::{CommandType, TypeRegistry};
use crate::value::Value;

/// One token of a partially typed command line and the type expected at
/// its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub value: String,
    pub ty: CommandType,
}

impl ParseResult {
    pub fn new(value: impl Into<String>, ty: CommandType) -> Self {
        Self {
            value: value.into(),
            ty,
        }
    }
}

/// Registry of typed commands keyed by path.
pub struct CommandManager {
    commands: HashMap<String, Command>,
    types: TypeRegistry,
    context: Arc<dyn CallContext>,
    config: CommandsConfig,
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("commands", &self.paths())
            .field("types", &self.types)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CommandManager {
    /// Create an empty manager with the default configuration.
    pub fn new(types: TypeRegistry) -> Self {
        Self::with_config(types, CommandsConfig::default())
    }

    /// Create an empty manager.
    pub fn with_config(types: TypeRegistry, config: CommandsConfig) -> Self {
        Self {
            commands: HashMap::new(),
            types,
            context: Arc::new(NoopContext),
            config,
        }
    }

    /// Set the context entered around every command execution.
    pub fn with_context(mut self, context: Arc<dyn CallContext>) -> Self {
        self.context = context;
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable access for registering host converters.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn context(&self) -> &dyn CallContext {
        self.context.as_ref()
    }

    pub fn config(&self) -> &CommandsConfig {
        &self.config
    }

    /// Register every command exposed by `addon` at its marked path.
    ///
    /// Under [`CollisionPolicy::Reject`] nothing is registered if any path
    /// is already taken.
    pub fn collect(&mut self, addon: &dyn Addon) -> Result<usize> {
        let defs = addon.commands();
        self.check_collisions(defs.iter().map(CommandDef::path))?;

        let count = defs.len();
        for def in defs {
            let path = def.path().to_string();
            self.insert(path, def, Some(addon.name().to_string()));
        }
        info!(addon = %addon.name(), count, "Collected commands");
        Ok(count)
    }

    /// Register a single command at `path`, regardless of the path it was
    /// defined with.
    pub fn add(&mut self, path: impl Into<String>, def: CommandDef) -> Result<()> {
        let path = path.into();
        self.check_collisions(std::iter::once(path.as_str()))?;
        let def = def.with_path(path.clone());
        self.insert(path, def, None);
        Ok(())
    }

    fn check_collisions<'a>(&self, paths: impl Iterator<Item = &'a str>) -> Result<()> {
        if self.config.collision != CollisionPolicy::Reject {
            return Ok(());
        }
        let mut seen = HashSet::new();
        for path in paths {
            if self.commands.contains_key(path) || !seen.insert(path) {
                return Err(CommandError::PathCollision(path.to_string()));
            }
        }
        Ok(())
    }

    fn insert(&mut self, path: String, def: CommandDef, origin: Option<String>) {
        let command = Command::new(def, origin, self.config.help_width);
        if self.commands.insert(path.clone(), command).is_some() {
            warn!(path = %path, "Replaced existing command");
        }
    }

    /// Unregister a command by path.
    pub fn remove(&mut self, path: &str) -> Option<Command> {
        self.commands.remove(path)
    }

    /// Unregister every command collected from the named addon.
    pub fn remove_addon(&mut self, name: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|_, cmd| cmd.origin() != Some(name));
        let removed = before - self.commands.len();
        debug!(addon = %name, removed, "Removed addon commands");
        removed
    }

    pub fn get(&self, path: &str) -> Option<&Command> {
        self.commands.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.commands.contains_key(path)
    }

    /// All registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Call a command with a list of arguments.
    pub fn call_args(&self, path: &str, args: Vec<Value>) -> Result<Value> {
        match self.commands.get(path) {
            Some(command) => command.call(self, args),
            None => {
                debug!(path = %path, "Rejected unknown command");
                Err(CommandError::UnknownCommand(path.to_string()))
            }
        }
    }

    /// Tokenize and call a full command line.
    pub fn call(&self, line: &str) -> Result<Value> {
        let mut parts = lexer::split(line)?.into_iter();
        let Some(path) = parts.next() else {
            return Err(CommandError::InvalidCommand(line.to_string()));
        };
        self.call_args(&path, parts.map(Value::Str).collect())
    }

    /// Parse a possibly incomplete command line for completion.
    ///
    /// Never fails: an unparsable tail is kept verbatim as the last token.
    /// An empty line yields a single empty command token, and trailing
    /// whitespace yields an empty token for the next argument.
    pub fn parse_partial(&self, line: &str) -> Vec<ParseResult> {
        let mut parts = Vec::new();
        let mut open_tail = false;
        let mut lexer = Lexer::new(line);
        loop {
            match lexer.next_token() {
                Ok(Some(token)) => {
                    open_tail = token.end < line.len();
                    parts.push(token.value);
                }
                Ok(None) => break,
                Err(err) => {
                    let rest = &line[err.offset()..];
                    open_tail = rest.ends_with(char::is_whitespace);
                    parts.push(rest.to_string());
                    break;
                }
            }
        }
        if parts.is_empty() || open_tail {
            parts.push(String::new());
        }

        let mut queue: VecDeque<CommandType> = VecDeque::new();
        let mut tail: Option<CommandType> = None;
        let mut results = Vec::with_capacity(parts.len());

        for (i, part) in parts.into_iter().enumerate() {
            let ty = if i == 0 {
                if let Some(command) = self.commands.get(&part) {
                    expect_params(command, &mut queue, &mut tail);
                }
                CommandType::Cmd
            } else if let Some(ty) = queue.pop_front() {
                if ty == CommandType::Cmd
                    && queue.front() == Some(&CommandType::Arg)
                    && let Some(nested) = self.commands.get(&part)
                {
                    queue.clear();
                    expect_params(nested, &mut queue, &mut tail);
                }
                ty
            } else if let Some(ty) = &tail {
                ty.clone()
            } else {
                CommandType::Str
            };
            results.push(ParseResult { value: part, ty });
        }
        results
    }

    /// Write the command catalog, sorted by signature.
    ///
    /// Each entry is its help text as `# ` comment lines, the signature line,
    /// and a blank line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut entries: Vec<(String, &Command)> = self
            .iter()
            .map(|cmd| (cmd.signature_help(&self.types), cmd))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (signature, cmd) in entries {
            for line in cmd.help().unwrap_or_default().lines() {
                writeln!(out, "# {line}")?;
            }
            writeln!(out, "{signature}")?;
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Queue a command's parameter types for the following positions. The
/// element type of a variadic parameter keeps applying once the queue
/// drains.
fn expect_params(
    command: &Command,
    queue: &mut VecDeque<CommandType>,
    tail: &mut Option<CommandType>,
) {
    queue.extend(command.param_types().cloned());
    *tail = if command.is_variadic() {
        command.param_types().last().cloned()
    } else {
        None
    };
}
