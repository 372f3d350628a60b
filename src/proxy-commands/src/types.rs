//! Semantic type descriptors and the pluggable converter registry.
//!
//! A [`CommandType`] names what a parameter or return value means. The
//! [`TypeRegistry`] maps each descriptor kind to a [`TypeConverter`] that can
//! parse raw text into a [`Value`], display the type, and check whether an
//! already-typed value satisfies it. Host applications register converters
//! for their own domain types under [`CommandType::Custom`] kinds.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::CommandError;
use crate::manager::CommandManager;
use crate::value::Value;

/// A converter rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TypeError(pub String);

impl TypeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Semantic type descriptor for command parameters and return values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// No value. Only valid as a return type.
    Unit,
    Str,
    Int,
    Bool,
    /// A filesystem path; `~` expands to the home directory.
    Path,
    /// A command path.
    Cmd,
    /// An argument of a nested command. Follows a `Cmd` parameter.
    Arg,
    /// Comma-separated sequence of the element type.
    Seq(Box<CommandType>),
    /// One of the strings returned by the named options command.
    Choice(String),
    /// A host domain type, e.g. `flow`.
    Custom(String),
}

impl CommandType {
    pub fn seq(element: CommandType) -> Self {
        Self::Seq(Box::new(element))
    }

    pub fn choice(options_cmd: impl Into<String>) -> Self {
        Self::Choice(options_cmd.into())
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Registry key. Parameterized descriptors share one key per kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Unit => "none",
            Self::Str => "str",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Path => "path",
            Self::Cmd => "cmd",
            Self::Arg => "arg",
            Self::Seq(_) => "seq",
            Self::Choice(_) => "choice",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(inner) => write!(f, "seq<{inner}>"),
            Self::Choice(cmd) => write!(f, "choice<{cmd}>"),
            other => f.write_str(other.kind()),
        }
    }
}

/// Conversion capability for one descriptor kind.
pub trait TypeConverter: Send + Sync {
    /// Human-readable type name used in signatures.
    fn display(&self, ty: &CommandType, types: &TypeRegistry) -> String;

    /// Convert raw command-line text into a value of `ty`.
    fn parse(
        &self,
        manager: &CommandManager,
        ty: &CommandType,
        raw: &str,
    ) -> Result<Value, TypeError>;

    /// Whether `value` already satisfies `ty`.
    fn matches(&self, ty: &CommandType, value: &Value, types: &TypeRegistry) -> bool;

    /// Whether string arguments must always go through [`parse`](Self::parse),
    /// even when they already match. Set for types whose parse normalizes or
    /// validates text that is otherwise indistinguishable from a plain string.
    fn parses_text(&self, _ty: &CommandType) -> bool {
        false
    }
}

/// Process-wide lookup from descriptor kind to converter.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    converters: HashMap<String, Arc<dyn TypeConverter>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("TypeRegistry").field("kinds", &kinds).finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in converters.
    pub fn with_builtins() -> Self {
        let mut types = Self::new();
        types.register("str", StrType);
        types.register("int", IntType);
        types.register("bool", BoolType);
        types.register("path", PathType);
        types.register("cmd", CmdType);
        types.register("arg", ArgType);
        types.register("seq", SeqType);
        types.register("choice", ChoiceType);
        types
    }

    /// Register a converter for a kind, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, converter: impl TypeConverter + 'static) {
        self.converters.insert(kind.into(), Arc::new(converter));
    }

    /// Look up the converter for a descriptor.
    pub fn get(&self, ty: &CommandType) -> Option<&dyn TypeConverter> {
        self.converters.get(ty.kind()).map(|c| &**c)
    }

    /// Like [`get`](Self::get), but unsupported types are an error.
    pub fn converter(&self, ty: &CommandType) -> Result<&dyn TypeConverter, CommandError> {
        self.get(ty)
            .ok_or_else(|| CommandError::UnsupportedType(ty.to_string()))
    }

    /// Whether every descriptor in `ty` (including sequence elements) has a
    /// converter. `Unit` needs none.
    pub fn supports(&self, ty: &CommandType) -> bool {
        match ty {
            CommandType::Unit => true,
            CommandType::Seq(inner) => self.get(ty).is_some() && self.supports(inner),
            _ => self.get(ty).is_some(),
        }
    }

    /// Display name of a descriptor. `Unit` renders as an empty string.
    pub fn display_name(&self, ty: &CommandType) -> Result<String, CommandError> {
        if *ty == CommandType::Unit {
            return Ok(String::new());
        }
        Ok(self.converter(ty)?.display(ty, self))
    }

    /// Type-check a value against a descriptor.
    pub fn check(&self, ty: &CommandType, value: &Value) -> Result<bool, CommandError> {
        if *ty == CommandType::Unit {
            return Ok(value.is_none());
        }
        Ok(self.converter(ty)?.matches(ty, value, self))
    }
}

struct StrType;

impl TypeConverter for StrType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "str".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        Ok(Value::from(raw))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Str(_))
    }
}

struct IntType;

impl TypeConverter for IntType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "int".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| TypeError::new(format!("Not an integer: {raw}")))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Int(_))
    }
}

struct BoolType;

impl TypeConverter for BoolType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "bool".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(TypeError::new(format!(
                "Booleans are 'true' or 'false', got {raw}"
            ))),
        }
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Bool(_))
    }
}

struct PathType;

impl TypeConverter for PathType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "path".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        Ok(Value::Str(expand_home(raw)))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Str(_))
    }

    fn parses_text(&self, _: &CommandType) -> bool {
        true
    }
}

fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return raw.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => raw.to_string(),
    }
}

struct CmdType;

impl TypeConverter for CmdType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "cmd".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        Ok(Value::from(raw))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Str(_))
    }
}

struct ArgType;

impl TypeConverter for ArgType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "arg".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        Ok(Value::from(raw))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Str(_))
    }
}

struct SeqType;

impl TypeConverter for SeqType {
    fn display(&self, ty: &CommandType, types: &TypeRegistry) -> String {
        match ty {
            CommandType::Seq(inner) => {
                let name = types
                    .display_name(inner)
                    .unwrap_or_else(|_| inner.to_string());
                format!("[{name}]")
            }
            other => other.to_string(),
        }
    }

    fn parse(
        &self,
        manager: &CommandManager,
        ty: &CommandType,
        raw: &str,
    ) -> Result<Value, TypeError> {
        let CommandType::Seq(inner) = ty else {
            return Err(TypeError::new(format!("Not a sequence type: {ty}")));
        };
        let converter = manager
            .types()
            .get(inner)
            .ok_or_else(|| TypeError::new(format!("Unsupported element type: {inner}")))?;
        if raw.trim().is_empty() {
            return Ok(Value::Seq(Vec::new()));
        }
        raw.split(',')
            .map(|part| converter.parse(manager, inner, part.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq)
    }

    fn matches(&self, ty: &CommandType, value: &Value, types: &TypeRegistry) -> bool {
        let (CommandType::Seq(inner), Value::Seq(items)) = (ty, value) else {
            return false;
        };
        items
            .iter()
            .all(|item| types.check(inner, item).unwrap_or(false))
    }
}

struct ChoiceType;

impl TypeConverter for ChoiceType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "choice".to_string()
    }

    fn parse(
        &self,
        manager: &CommandManager,
        ty: &CommandType,
        raw: &str,
    ) -> Result<Value, TypeError> {
        let CommandType::Choice(options_cmd) = ty else {
            return Err(TypeError::new(format!("Not a choice type: {ty}")));
        };
        let options = manager
            .call_args(options_cmd, Vec::new())
            .map_err(|e| TypeError::new(format!("Could not list choices: {e}")))?;
        let valid = options
            .as_seq()
            .is_some_and(|items| items.iter().any(|o| o.as_str() == Some(raw)));
        if valid {
            Ok(Value::from(raw))
        } else {
            Err(TypeError::new(format!("Invalid choice: {raw}")))
        }
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Str(_))
    }

    // Membership depends on the options command.
    fn parses_text(&self, _: &CommandType) -> bool {
        true
    }
}
