//! engine::restack
//!
//! The Restack Engine (C5): rebases a scoped set of tracked branches back
//! onto their recorded bases, in an order that never rebases a branch before
//! its own base has settled.
//!
//! # Architecture
//!
//! [`Scope`] turns a requested branch plus a traversal mode into an ordered
//! list of branches using [`crate::core::graph::StackGraph`]; [`run`] walks
//! that list, rebasing each branch through [`crate::git::Git::rebase`] and
//! recording the new base hash through [`crate::core::repository::Repository`].
//! A rebase that stops partway through is handed to [`crate::engine::rescue`],
//! which queues a continuation and returns the sentinel error that aborts
//! the walk - the remaining branches in scope are rebased on the next
//! `restack` invocation once the user re-enters through the continuation.

use crate::core::errors::CoreError;
use crate::core::graph::StackGraph;
use crate::core::repository::{BranchPatch, Repository};
use crate::core::types::{BranchName, Oid, RefName};
use crate::engine::rescue::{self, RescueInput};
use crate::git::{Git, RebaseOutcome, RebaseRequest};

/// How far up/down the stack from the requested branch to restack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only the requested branch.
    Branch,
    /// Every descendant of the requested branch, excluding it.
    UpstackExclusive,
    /// Every ancestor of the requested branch up to trunk, excluding it.
    DownstackExclusive,
    /// The requested branch and every descendant.
    Upstack,
    /// The requested branch and every ancestor up to trunk.
    Downstack,
    /// Every branch transitively connected to the requested branch.
    Stack,
}

impl Scope {
    /// Resolve this scope against `graph`, rooted at `branch`, into the
    /// order branches should be visited: every branch's base is visited
    /// before the branch itself.
    fn order(self, graph: &StackGraph, branch: &BranchName) -> Vec<BranchName> {
        match self {
            Scope::Branch => vec![branch.clone()],
            Scope::UpstackExclusive => without(graph.upstack(branch), branch),
            Scope::DownstackExclusive => without(graph.downstack(branch), branch),
            Scope::Upstack => graph.upstack(branch),
            Scope::Downstack => graph.downstack(branch),
            Scope::Stack => graph.stack(branch),
        }
    }
}

fn without(mut branches: Vec<BranchName>, exclude: &BranchName) -> Vec<BranchName> {
    branches.retain(|b| b != exclude);
    branches
}

/// A restack request.
pub struct Request {
    /// The branch the user invoked `restack` on.
    pub branch: BranchName,
    /// How far to walk from it.
    pub scope: Scope,
    /// The CLI invocation to queue as a continuation if a rebase is
    /// interrupted, e.g. `["branch", "restack"]`.
    pub continue_command: Vec<String>,
}

/// What happened to one branch in the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// Rebased onto its base's current tip.
    Restacked { new_head: Oid },
    /// Already sat on its base's current tip; nothing to do.
    AlreadyRestacked,
    /// Not rebased because it's checked out in another worktree.
    SkippedCheckedOutElsewhere,
}

/// Result of a completed (non-interrupted) restack walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestackResult {
    pub branches: Vec<(BranchName, BranchOutcome)>,
}

/// Run a restack request to completion, or return the
/// [`CoreError::RebaseInterrupted`] sentinel if a rebase stops partway
/// through.
pub fn run(git: &Git, repo: &Repository<'_>, request: Request) -> Result<RestackResult, CoreError> {
    let trunk = repo.trunk()?;

    if request.branch != trunk && repo.lookup(&request.branch)?.is_none() {
        return Err(CoreError::UntrackedBranch(
            request.branch.as_str().to_string(),
        ));
    }

    let graph = repo.graph()?;
    let order = request.scope.order(&graph, &request.branch);

    let original_branch = git.current_branch()?;
    let mut branches = Vec::with_capacity(order.len());

    for branch in order {
        if branch == trunk {
            continue;
        }

        if git.branches_checked_out_elsewhere()?.contains(&branch) {
            branches.push((branch, BranchOutcome::SkippedCheckedOutElsewhere));
            continue;
        }

        let record = repo
            .lookup(&branch)?
            .ok_or_else(|| CoreError::UntrackedBranch(branch.as_str().to_string()))?;
        let base_name = BranchName::new(&record.base.name).map_err(crate::git::GitError::from)?;
        let base_head = git.resolve_ref(&RefName::for_branch(&base_name).to_string())?;
        let branch_tip = git.resolve_ref(&RefName::for_branch(&branch).to_string())?;

        if is_already_restacked(git, &record, &base_head, &branch_tip)? {
            branches.push((branch, BranchOutcome::AlreadyRestacked));
            continue;
        }

        let old_base = match &record.base.hash {
            Some(hash) => Oid::new(hash.clone()).map_err(crate::git::GitError::from)?,
            None => git
                .merge_base(&base_head, &branch_tip)?
                .unwrap_or_else(Oid::zero),
        };

        git.checkout(&branch)?;

        tracing::debug!(branch = %branch, base = %base_name, "restacking branch");
        match git.rebase(RebaseRequest {
            branch: &branch,
            onto: &base_head,
            upstream: &old_base,
        })? {
            RebaseOutcome::Success { new_head } => {
                repo.begin_tx()
                    .upsert(
                        branch.clone(),
                        BranchPatch::new().base_hash(base_head.as_str()),
                    )
                    .commit(&format!("lattice: restack {}", branch.as_str()))?;
                tracing::info!(branch = %branch, %new_head, "restacked");
                branches.push((branch, BranchOutcome::Restacked { new_head }));
            }
            RebaseOutcome::Interrupted { branch: stopped, .. } => {
                return Err(rescue::rescue(
                    git,
                    RescueInput {
                        branch: stopped.clone(),
                        command: request.continue_command,
                        message: format!(
                            "rebase of '{}' onto '{}' was interrupted",
                            stopped.as_str(),
                            base_name.as_str()
                        ),
                    },
                )?);
            }
        }
    }

    if let Some(original) = original_branch {
        if !git.branches_checked_out_elsewhere()?.contains(&original) {
            git.checkout(&original)?;
        }
    }

    Ok(RestackResult { branches })
}

/// A branch is already restacked when its recorded base hash matches the
/// base's current tip and that tip is still an ancestor of the branch -
/// i.e. no commits are missing between the two.
fn is_already_restacked(
    git: &Git,
    record: &crate::core::repository::BranchRecord,
    current_base_head: &Oid,
    branch_tip: &Oid,
) -> Result<bool, CoreError> {
    let Some(recorded) = &record.base.hash else {
        return Ok(false);
    };
    if recorded != current_base_head.as_str() {
        return Ok(false);
    }
    Ok(git.is_ancestor(current_base_head, branch_tip)?)
}
