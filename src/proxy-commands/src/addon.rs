//! Addon capability for exposing commands.

use crate::definition::CommandDef;

/// An extension that exposes commands to the [`CommandManager`].
///
/// [`CommandManager`]: crate::CommandManager
pub trait Addon {
    /// Name used to track which commands came from this addon.
    fn name(&self) -> &str;

    /// Every command this addon exposes, each marked with its path.
    fn commands(&self) -> Vec<CommandDef>;
}
