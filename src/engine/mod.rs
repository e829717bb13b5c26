//! engine
//!
//! Orchestration on top of [`crate::core`]: restacking a stack of tracked
//! branches (C5), rescuing an interrupted rebase into a resumable
//! continuation (C7), and reconciling branches with their change requests
//! on a remote forge (C9).
//!
//! # Architecture
//!
//! Command handlers in [`crate::cli::commands`] build a [`Context`] from CLI
//! flags, open the repository, and call into one of:
//!
//! - [`restack`] - the Restack Engine (C5)
//! - [`rescue`] - Rebase Rescue (C7), invoked by `restack` on conflict
//! - [`submit`] - the Submit Pipeline (C9)
//!
//! None of these modules perform ad hoc git2 calls; they go through
//! [`crate::git::Git`] and [`crate::core::repository::Repository`].

pub mod rescue;
pub mod restack;
pub mod submit;

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command
/// behavior. Built once in `cli::run` and threaded through every handler.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Git hook verification enabled.
    /// When false, git commands are invoked with --no-verify.
    pub verify: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            verify: true,
        }
    }
}

impl Context {
    /// Resolve the working directory: the explicit override, or the
    /// process's current directory.
    pub fn resolve_cwd(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let ctx = Context::default();
        assert!(ctx.cwd.is_none());
        assert!(!ctx.debug);
        assert!(!ctx.quiet);
        assert!(ctx.interactive);
        assert!(ctx.verify);
    }

    #[test]
    fn custom_values() {
        let ctx = Context {
            cwd: Some(PathBuf::from("/custom")),
            debug: true,
            quiet: true,
            interactive: false,
            verify: false,
        };
        assert_eq!(ctx.cwd, Some(PathBuf::from("/custom")));
        assert!(ctx.debug);
        assert!(ctx.quiet);
        assert!(!ctx.interactive);
        assert!(!ctx.verify);
    }
}
