//! A registered command and its call contract.

use tracing::debug;

use crate::context::ContextGuard;
use crate::definition::{CommandDef, Param};
use crate::error::{CommandError, Result};
use crate::manager::CommandManager;
use crate::types::{CommandType, TypeRegistry};
use crate::value::Value;

/// One callable operation with a verified type contract.
///
/// Owned by the [`CommandManager`] that registered it.
#[derive(Debug, Clone)]
pub struct Command {
    def: CommandDef,
    help: Option<String>,
    origin: Option<String>,
}

impl Command {
    pub(crate) fn new(def: CommandDef, origin: Option<String>, help_width: usize) -> Self {
        let help = def.help().and_then(|text| wrap_help(text, help_width));
        Self { def, help, origin }
    }

    pub fn path(&self) -> &str {
        self.def.path()
    }

    pub fn params(&self) -> &[Param] {
        self.def.params()
    }

    /// Declared parameter types in order.
    pub fn param_types(&self) -> impl Iterator<Item = &CommandType> {
        self.def.params().iter().map(|p| &p.ty)
    }

    pub fn returns(&self) -> &CommandType {
        self.def.returns()
    }

    pub fn is_variadic(&self) -> bool {
        self.def.is_variadic()
    }

    /// Help text, whitespace-normalized and wrapped.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Name of the addon this command was collected from, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Display names of the parameters; the variadic one is prefixed with `*`.
    pub fn param_names(&self, types: &TypeRegistry) -> Vec<String> {
        let mut names: Vec<String> = self.param_types().map(|ty| type_name(types, ty)).collect();
        if self.is_variadic()
            && let Some(last) = names.last_mut()
        {
            last.insert(0, '*');
        }
        names
    }

    /// Display name of the return type, empty for `Unit`.
    pub fn return_name(&self, types: &TypeRegistry) -> String {
        type_name(types, self.returns())
    }

    /// `<path> <type1> <type2> ... [-> <returntype>]`
    pub fn signature_help(&self, types: &TypeRegistry) -> String {
        let mut sig = self.path().to_string();
        for name in self.param_names(types) {
            sig.push(' ');
            sig.push_str(&name);
        }
        let ret = self.return_name(types);
        if !ret.is_empty() {
            sig.push_str(" -> ");
            sig.push_str(&ret);
        }
        sig
    }

    /// Call the command.
    ///
    /// Arguments are usually raw strings from a command line, but already
    /// typed values are accepted as-is when they satisfy their parameter.
    pub fn call(&self, manager: &CommandManager, args: Vec<Value>) -> Result<Value> {
        let types = manager.types();
        let params = self.params();
        let fixed = self.def.fixed_arity();

        let arity_ok = if self.is_variadic() {
            args.len() >= fixed
        } else {
            args.len() == params.len()
        };
        if !arity_ok {
            return Err(CommandError::Usage(self.signature_help(types)));
        }

        if let Some(ty) = self
            .param_types()
            .chain(std::iter::once(self.returns()))
            .find(|ty| !types.supports(ty))
        {
            return Err(CommandError::UnsupportedType(ty.to_string()));
        }

        let mut args = args;
        let remainder = args.split_off(fixed);

        let mut pargs = Vec::with_capacity(fixed + remainder.len());
        for (arg, param) in args.into_iter().zip(params) {
            pargs.push(self.convert(manager, arg, &param.ty)?);
        }

        if !remainder.is_empty() {
            let element = &params[params.len() - 1].ty;
            let converted: Option<Vec<Value>> = remainder
                .iter()
                .map(|arg| self.convert(manager, arg.clone(), element).ok())
                .collect();
            match converted {
                Some(values) => pargs.extend(values),
                None => {
                    return Err(CommandError::InvalidValueType {
                        value: Value::Seq(remainder).to_string(),
                        expected: type_name(types, element),
                    });
                }
            }
        }

        debug!(path = %self.path(), args = pargs.len(), "Calling command");
        let ret = {
            let _guard = ContextGuard::enter(manager.context(), self.path());
            (self.def.handler())(&pargs)?
        };

        if !types.check(self.returns(), &ret)? {
            return Err(CommandError::UnexpectedReturn(self.path().to_string()));
        }
        Ok(ret)
    }

    fn convert(&self, manager: &CommandManager, arg: Value, ty: &CommandType) -> Result<Value> {
        let types = manager.types();
        let converter = types.converter(ty)?;
        let reparse = matches!(arg, Value::Str(_)) && converter.parses_text(ty);
        if !reparse && types.check(ty, &arg)? {
            return Ok(arg);
        }
        match arg {
            Value::Str(raw) => converter
                .parse(manager, ty, &raw)
                .map_err(|e| CommandError::InvalidArgument(e.to_string())),
            other => Err(CommandError::InvalidArgument(format!(
                "{other} is not a valid {}",
                converter.display(ty, types)
            ))),
        }
    }
}

fn type_name(types: &TypeRegistry, ty: &CommandType) -> String {
    types.display_name(ty).unwrap_or_else(|_| ty.to_string())
}

/// Collapse whitespace and wrap to `width` columns.
fn wrap_help(text: &str, width: usize) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(textwrap::fill(&collapsed, width))
}
