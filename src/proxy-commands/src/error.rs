//! Error types for command registration, parsing and execution.

use thiserror::Error;

use crate::lexer::LexError;

/// Errors surfaced to the host by the command system.
///
/// Every user-facing failure maps to one of these variants; none of them is
/// fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command line could not be tokenized.
    #[error("Invalid command: {0}")]
    Syntax(#[from] LexError),

    /// The command line contained no tokens.
    #[error("Invalid command: {0:?}")]
    InvalidCommand(String),

    /// No command is registered at this path.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Wrong number of arguments. Carries the expected signature.
    #[error("Usage: {0}")]
    Usage(String),

    /// An argument could not be converted to its declared type.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Trailing variadic arguments failed the element type check.
    #[error("Invalid value type: {value} - expected {expected}")]
    InvalidValueType { value: String, expected: String },

    /// A declared parameter or return type has no registered converter.
    #[error("Unsupported argument type: {0}")]
    UnsupportedType(String),

    /// The wrapped operation returned a value of the wrong type.
    #[error("Command returned unexpected data: {0}")]
    UnexpectedReturn(String),

    /// Arguments did not bind against the declared parameters.
    #[error("Argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// The command definition itself is malformed.
    #[error("Invalid command definition: {0}")]
    InvalidDefinition(String),

    /// A path was registered twice while collisions are rejected.
    #[error("Command already registered: {0}")]
    PathCollision(String),

    /// The operation reported a failure of its own.
    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// Create an operation failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;
