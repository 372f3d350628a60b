//! Command manager configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default column width for wrapped help text.
pub const DEFAULT_HELP_WIDTH: usize = 70;

/// Errors loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// What happens when a path is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The last registration wins.
    #[default]
    Overwrite,
    /// Re-registration fails with `PathCollision`.
    Reject,
}

/// Configuration for a [`CommandManager`](crate::CommandManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Policy for duplicate command paths.
    pub collision: CollisionPolicy,

    /// Column width used to wrap help text.
    pub help_width: usize,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::default(),
            help_width: DEFAULT_HELP_WIDTH,
        }
    }
}

impl CommandsConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CommandsConfig::from_toml_str("").unwrap();
        assert_eq!(config, CommandsConfig::default());
        assert_eq!(config.help_width, 70);
        assert_eq!(config.collision, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_parse() {
        let config = CommandsConfig::from_toml_str(
            r#"
collision = "reject"
help_width = 50
"#,
        )
        .unwrap();
        assert_eq!(config.collision, CollisionPolicy::Reject);
        assert_eq!(config.help_width, 50);
    }

    #[test]
    fn test_invalid_policy() {
        let err = CommandsConfig::from_toml_str(r#"collision = "merge""#).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("commands.toml");
        std::fs::write(&path, "help_width = 60\n").unwrap();

        let config = CommandsConfig::load(&path).unwrap();
        assert_eq!(config.help_width, 60);

        let missing = CommandsConfig::load(temp.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
