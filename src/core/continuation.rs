//! core::continuation
//!
//! The Continuation Stack (C6): an append-only list of resumable CLI
//! invocations, persisted under a single `continuations` key in the store.
//!
//! A continuation is not a coroutine - the process exits between the user
//! resolving a conflict and re-invoking Lattice. What's persisted is just
//! enough to re-enter the CLI and resume: the command to run, the branch it
//! was operating on, and a human-readable reason.

use serde::{Deserialize, Serialize};

use crate::core::store::{Store, StoreError, Update};
use crate::git::Git;

const CONTINUATIONS_KEY: &str = "continuations";

/// One queued resumption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Continuation {
    /// The CLI invocation to re-run, e.g. `["stack", "restack"]`.
    pub command: Vec<String>,
    /// The branch the interrupted operation was working on.
    pub branch: String,
    /// Human-readable reason, shown to the user when the continuation runs.
    pub message: String,
}

/// Errors from continuation-stack operations.
#[derive(Debug, thiserror::Error)]
pub enum ContinuationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("corrupt continuation stack: {0}")]
    Corrupt(String),
}

/// Handle onto the persisted continuation stack.
pub struct ContinuationStack<'a> {
    store: Store<'a>,
}

impl<'a> ContinuationStack<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self {
            store: Store::new(git),
        }
    }

    /// Peek at every queued continuation without draining the stack.
    pub fn list(&self) -> Result<Vec<Continuation>, ContinuationError> {
        self.read_all()
    }

    fn read_all(&self) -> Result<Vec<Continuation>, ContinuationError> {
        match self.store.get_string(CONTINUATIONS_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| ContinuationError::Corrupt(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, entries: &[Continuation], message: &str) -> Result<(), ContinuationError> {
        let body = serde_json::to_vec_pretty(entries).expect("Vec<Continuation> always serializes");
        if entries.is_empty() {
            self.store
                .update(Update::new().delete(CONTINUATIONS_KEY), message)?;
        } else {
            self.store
                .update(Update::new().write(CONTINUATIONS_KEY, body), message)?;
        }
        Ok(())
    }

    /// Append one continuation to the end of the stack (push order).
    pub fn append(&self, entry: Continuation) -> Result<(), ContinuationError> {
        let mut entries = self.read_all()?;
        let message = format!("lattice: queue continuation for {}", entry.branch);
        entries.push(entry);
        self.write_all(&entries, &message)
    }

    /// Atomically read and clear the whole stack, returning entries in push
    /// order. `reason` becomes part of the commit message on the data ref.
    pub fn take_all(&self, reason: &str) -> Result<Vec<Continuation>, ContinuationError> {
        let entries = self.read_all()?;
        if entries.is_empty() {
            return Ok(entries);
        }
        self.write_all(&[], &format!("lattice: clear continuations ({reason})"))?;
        Ok(entries)
    }

    /// Clear the stack without returning its contents. Called at the start
    /// of every new user-initiated (non-continuation) operation.
    pub fn clear(&self, reason: &str) -> Result<(), ContinuationError> {
        self.take_all(reason).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git) {
        let dir = TempDir::new().unwrap();
        Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        Command::new("git")
            .args(["config", "user.email", "t@example.com"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        std::fs::write(dir.path().join("README"), "hi").unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(dir.path())
            .status()
            .unwrap();
        Command::new("git")
            .args(["commit", "-q", "-m", "initial"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        let git = Git::open(dir.path()).unwrap();
        (dir, git)
    }

    #[test]
    fn take_all_on_empty_stack_is_empty() {
        let (_dir, git) = init_repo();
        let stack = ContinuationStack::new(&git);
        assert!(stack.take_all("test").unwrap().is_empty());
    }

    #[test]
    fn append_then_take_all_in_push_order() {
        let (_dir, git) = init_repo();
        let stack = ContinuationStack::new(&git);

        stack
            .append(Continuation {
                command: vec!["stack".into(), "restack".into()],
                branch: "b".into(),
                message: "interrupted: branch b".into(),
            })
            .unwrap();
        stack
            .append(Continuation {
                command: vec!["stack".into(), "restack".into()],
                branch: "c".into(),
                message: "interrupted: branch c".into(),
            })
            .unwrap();

        let entries = stack.take_all("resume").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].branch, "b");
        assert_eq!(entries[1].branch, "c");

        // Stack is drained after take_all.
        assert!(stack.take_all("again").unwrap().is_empty());
    }

    #[test]
    fn list_does_not_drain() {
        let (_dir, git) = init_repo();
        let stack = ContinuationStack::new(&git);
        stack
            .append(Continuation {
                command: vec!["up".into()],
                branch: "b".into(),
                message: "m".into(),
            })
            .unwrap();

        assert_eq!(stack.list().unwrap().len(), 1);
        assert_eq!(stack.list().unwrap().len(), 1);
    }

    #[test]
    fn clear_empties_without_returning() {
        let (_dir, git) = init_repo();
        let stack = ContinuationStack::new(&git);
        stack
            .append(Continuation {
                command: vec!["up".into()],
                branch: "b".into(),
                message: "m".into(),
            })
            .unwrap();
        stack.clear("new operation").unwrap();
        assert!(stack.take_all("check").unwrap().is_empty());
    }
}
