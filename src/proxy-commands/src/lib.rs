//! Typed command system for the proxy console.
//!
//! Addons expose operations under stable dotted paths such as
//! `flow.resume`. The console and scripting front ends invoke them by
//! command line; this crate tokenizes the line, converts each token to the
//! parameter's declared type, runs the operation inside the host's call
//! context and checks the returned value against the declared return type.
//!
//! # Defining commands
//!
//! ```rust,ignore
//! use proxy_commands::{Addon, CommandDef, CommandType, Value, command};
//!
//! struct Counter;
//!
//! impl Addon for Counter {
//!     fn name(&self) -> &str {
//!         "counter"
//!     }
//!
//!     fn commands(&self) -> Vec<CommandDef> {
//!         vec![command("sum")
//!             .variadic("values", CommandType::Int)
//!             .returns(CommandType::Int)
//!             .help("Add up integers.")
//!             .handler(|args| Ok(Value::Int(args.iter().filter_map(Value::as_int).sum())))
//!             .expect("valid definition")]
//!     }
//! }
//! ```
//!
//! # Calling and completing
//!
//! ```rust,ignore
//! use proxy_commands::{CommandManager, TypeRegistry};
//!
//! let mut manager = CommandManager::new(TypeRegistry::with_builtins());
//! manager.collect(&Counter)?;
//! assert_eq!(manager.call("sum 1 2 3")?, Value::Int(6));
//!
//! // Types expected at each position of an in-progress line.
//! let parts = manager.parse_partial("sum 1 ");
//! ```
//!
//! # Catalog
//!
//! [`CommandManager::dump`] writes every command as its help text in `#`
//! comment lines followed by its signature, sorted by signature.

mod addon;
mod command;
mod config;
mod context;
mod definition;
mod error;
pub mod lexer;
mod manager;
pub mod types;
mod value;

pub use addon::Addon;
pub use command::Command;
pub use config::{CollisionPolicy, CommandsConfig, ConfigError, DEFAULT_HELP_WIDTH};
pub use context::{CallContext, ContextGuard, NoopContext};
pub use definition::{CommandBuilder, CommandDef, Handler, Param, command};
pub use error::{CommandError, Result};
pub use lexer::LexError;
pub use manager::{CommandManager, ParseResult};
pub use types::{CommandType, TypeConverter, TypeError, TypeRegistry};
pub use value::{Opaque, Value};

/// Re-export common types for convenience.
pub mod prelude {
    pub use crate::{
        Addon, CommandDef, CommandError, CommandManager, CommandType, TypeRegistry, Value,
        command,
    };
}
