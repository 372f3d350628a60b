//! Scoped execution context around a single command invocation.

use std::fmt;

/// Host hook bracketing each command execution.
///
/// The host uses it to batch side effects or to suppress notifications
/// triggered by the command itself. `exit` is called exactly once for each
/// `enter`, including when the operation fails or panics.
pub trait CallContext: Send + Sync {
    fn enter(&self, path: &str);
    fn exit(&self, path: &str);
}

/// Context that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopContext;

impl CallContext for NoopContext {
    fn enter(&self, _path: &str) {}
    fn exit(&self, _path: &str) {}
}

/// RAII guard that releases the context when dropped.
pub struct ContextGuard<'a> {
    context: &'a dyn CallContext,
    path: &'a str,
}

impl<'a> ContextGuard<'a> {
    /// Enter `context` for the command at `path`.
    pub fn enter(context: &'a dyn CallContext, path: &'a str) -> Self {
        context.enter(path);
        Self { context, path }
    }
}

impl fmt::Debug for ContextGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard").field("path", &self.path).finish()
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.exit(self.path);
    }
}
