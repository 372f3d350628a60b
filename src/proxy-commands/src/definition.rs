//! Declarative command definitions.
//!
//! A definition is built with [`command`], which marks an operation with its
//! command path and declares its parameter and return types up front. Type
//! overrides given with [`CommandBuilder::argument`] are resolved once when
//! the definition is built and never change afterwards.
//!
//! ```rust,ignore
//! use proxy_commands::{CommandType, Value, command};
//!
//! let def = command("view.focus.set")
//!     .param("index", CommandType::Int)
//!     .help("Focus the flow at the given index.")
//!     .handler(|args| Ok(Value::None))?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{CommandError, Result};
use crate::types::CommandType;
use crate::value::Value;

/// The wrapped operation. Receives fully converted positional arguments.
pub type Handler = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// For the variadic parameter this is the element type.
    pub ty: CommandType,
}

/// An operation marked as a command at a path, with its type contract.
#[derive(Clone)]
pub struct CommandDef {
    path: String,
    params: Vec<Param>,
    variadic: bool,
    returns: CommandType,
    help: Option<String>,
    handler: Handler,
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

impl CommandDef {
    /// Command path this definition was marked with.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Whether the last parameter takes zero or more trailing arguments.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn returns(&self) -> &CommandType {
        &self.returns
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub(crate) fn with_path(mut self, path: String) -> Self {
        self.path = path;
        self
    }

    pub(crate) fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Number of parameters that must be given explicitly.
    pub fn fixed_arity(&self) -> usize {
        if self.variadic {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    /// Bind positional and keyword arguments against the declared
    /// parameters, the way a native call binds them.
    ///
    /// Returns the arguments in declaration order, with any variadic extras
    /// appended.
    pub fn bind(&self, positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Result<Vec<Value>> {
        let fixed = self.fixed_arity();
        let mut slots: Vec<Option<Value>> = vec![None; fixed];
        let mut extra = Vec::new();

        for (i, value) in positional.into_iter().enumerate() {
            if i < fixed {
                slots[i] = Some(value);
            } else if self.variadic {
                extra.push(value);
            } else {
                return Err(CommandError::ArgumentMismatch(
                    "too many positional arguments".to_string(),
                ));
            }
        }

        for (name, value) in keywords {
            match self.params[..fixed].iter().position(|p| p.name == name) {
                Some(i) if slots[i].is_some() => {
                    return Err(CommandError::ArgumentMismatch(format!(
                        "multiple values for argument '{name}'"
                    )));
                }
                Some(i) => slots[i] = Some(value),
                None => {
                    return Err(CommandError::ArgumentMismatch(format!(
                        "got an unexpected keyword argument '{name}'"
                    )));
                }
            }
        }

        let mut bound = Vec::with_capacity(fixed + extra.len());
        for (slot, param) in slots.into_iter().zip(&self.params) {
            let value = slot.ok_or_else(|| {
                CommandError::ArgumentMismatch(format!(
                    "missing a required argument: '{}'",
                    param.name
                ))
            })?;
            bound.push(value);
        }
        bound.extend(extra);
        Ok(bound)
    }

    /// Call the operation directly with already-typed arguments.
    ///
    /// Arguments are bound first, so programmer errors at the call site
    /// surface as [`CommandError::ArgumentMismatch`] instead of reaching the
    /// operation.
    pub fn invoke(&self, positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Result<Value> {
        let args = self.bind(positional, keywords)?;
        (self.handler)(&args)
    }
}

/// Start a command definition at `path`.
pub fn command(path: impl Into<String>) -> CommandBuilder {
    CommandBuilder {
        path: path.into(),
        params: Vec::new(),
        variadic: false,
        returns: CommandType::Unit,
        help: None,
        overrides: Vec::new(),
        errors: Vec::new(),
    }
}

/// Builder for [`CommandDef`].
#[derive(Debug)]
pub struct CommandBuilder {
    path: String,
    params: Vec<Param>,
    variadic: bool,
    returns: CommandType,
    help: Option<String>,
    overrides: Vec<(String, CommandType)>,
    errors: Vec<String>,
}

impl CommandBuilder {
    /// Declare the next positional parameter.
    pub fn param(mut self, name: impl Into<String>, ty: CommandType) -> Self {
        self.push_param(name.into(), ty);
        self
    }

    /// Declare a final parameter taking zero or more trailing arguments of
    /// `element` type.
    pub fn variadic(mut self, name: impl Into<String>, element: CommandType) -> Self {
        self.push_param(name.into(), element);
        self.variadic = true;
        self
    }

    /// Declare the return type. Defaults to `Unit`.
    pub fn returns(mut self, ty: CommandType) -> Self {
        self.returns = ty;
        self
    }

    /// Attach documentation shown in the command catalog.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Override the type of an already declared parameter, e.g. to narrow a
    /// `Str` to a `Choice`.
    pub fn argument(mut self, name: impl Into<String>, ty: CommandType) -> Self {
        self.overrides.push((name.into(), ty));
        self
    }

    /// Attach the operation and finish the definition.
    pub fn handler<F>(self, f: F) -> Result<CommandDef>
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let Self {
            path,
            mut params,
            variadic,
            returns,
            help,
            overrides,
            errors,
        } = self;

        if let Some(err) = errors.into_iter().next() {
            return Err(CommandError::InvalidDefinition(format!("{path}: {err}")));
        }

        let mut seen = HashSet::new();
        for param in &params {
            if !seen.insert(param.name.as_str()) {
                return Err(CommandError::InvalidDefinition(format!(
                    "{path}: duplicate parameter '{}'",
                    param.name
                )));
            }
        }

        for (name, ty) in overrides {
            let param = params.iter_mut().find(|p| p.name == name).ok_or_else(|| {
                CommandError::InvalidDefinition(format!("{path}: no parameter named '{name}'"))
            })?;
            param.ty = ty;
        }

        Ok(CommandDef {
            path,
            params,
            variadic,
            returns,
            help,
            handler: Arc::new(f),
        })
    }

    fn push_param(&mut self, name: String, ty: CommandType) {
        if self.variadic {
            self.errors
                .push(format!("parameter '{name}' follows the variadic parameter"));
        }
        self.params.push(Param { name, ty });
    }
}
