//! engine::rescue
//!
//! Rebase Rescue (C7): turns a rebase that stopped partway through into a
//! resumable [`Continuation`] and a sentinel [`CoreError::RebaseInterrupted`]
//! the CLI driver matches on, instead of surfacing the raw git failure.
//!
//! Queuing is idempotent: re-entering rescue for a branch that already has a
//! continuation queued does not push a second one, so a caller that calls
//! this twice for the same interrupted rebase (once from `restack`, once
//! from a command that wraps it) only ever queues one resumption.

use crate::core::continuation::{Continuation, ContinuationStack};
use crate::core::errors::CoreError;
use crate::core::types::BranchName;
use crate::git::Git;

/// What rescue needs to know about an interrupted rebase.
pub struct RescueInput {
    /// Branch whose rebase stopped.
    pub branch: BranchName,
    /// CLI invocation to re-run once the user resolves the rebase, e.g.
    /// `["stack", "restack"]`. Empty means "nothing to resume automatically"
    /// - no continuation is queued, only the sentinel error is returned.
    pub command: Vec<String>,
    /// Human-readable reason, surfaced to the user when the continuation runs.
    pub message: String,
}

/// Queue a continuation (unless one is already queued for this branch) and
/// return the [`CoreError::RebaseInterrupted`] sentinel for the caller to
/// propagate.
pub fn rescue(git: &Git, input: RescueInput) -> Result<CoreError, CoreError> {
    let stack = ContinuationStack::new(git);
    let already_queued = stack
        .list()?
        .iter()
        .any(|c| c.branch == input.branch.as_str());

    if already_queued {
        tracing::debug!(branch = %input.branch, "rebase interruption already has a queued continuation");
    } else if !input.command.is_empty() {
        stack.append(Continuation {
            command: input.command,
            branch: input.branch.as_str().to_string(),
            message: input.message,
        })?;
        tracing::info!(branch = %input.branch, "queued continuation after rebase interruption");
    }

    Ok(CoreError::RebaseInterrupted(input.branch.as_str().to_string()))
}
