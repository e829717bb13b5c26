//! core::errors
//!
//! Cross-module error taxonomy.
//!
//! Every module boundary in Lattice (repository, graph, engine, forge) has
//! its own `thiserror` enum for the failure modes specific to it. This
//! module adds one more layer on top: a small, stable set of [`ErrorKind`]
//! tags that let callers at the CLI boundary discriminate "what kind of
//! thing went wrong" without matching on every concrete error type from
//! every module. A handler that wants to print "not initialized, run
//! `lt init`" doesn't need to know whether the failure came from the store,
//! the repository, or the graph - it just asks `err.kind()`.

use thiserror::Error;

use crate::core::continuation::ContinuationError;
use crate::core::graph::GraphError;
use crate::core::repository::RepositoryError;
use crate::core::store::StoreError;
use crate::forge::ForgeError;
use crate::git::GitError;

/// Coarse-grained classification of a [`CoreError`], stable across the
/// concrete module that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named branch has no record.
    NotFound,
    /// The operation is not allowed in the branch's current state.
    Forbidden,
    /// The request is well-formed but cannot be satisfied.
    Unprocessable,
    /// The branch is already aligned with its parent; no restack needed.
    AlreadyRestacked,
    /// The branch is not tracked by Lattice.
    UntrackedBranch,
    /// A rebase stopped partway through and needs `lt continue`/`lt abort`.
    RebaseInterrupted,
    /// A continuation was already queued for this branch.
    RescuedRebase,
    /// The branch's base has not itself been submitted.
    UnsubmittedBase,
    /// Lattice has not been initialized in this repository.
    Uninitialized,
    /// A compare-and-swap update lost a race after retrying.
    ConcurrentUpdate,
    /// The repository is in an unexpected git state (merge/rebase/etc in progress).
    InvalidState,
    /// The underlying store or git layer failed.
    StoreError,
    /// The remote forge returned an error.
    ForgeError,
}

/// A domain error tagged with a coarse [`ErrorKind`] for cross-module
/// discrimination, wrapping the concrete error that actually occurred.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("branch '{0}' is not tracked")]
    UntrackedBranch(String),

    #[error("branch '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("branch '{0}' is already restacked")]
    AlreadyRestacked(String),

    #[error("rebase of '{0}' was interrupted and needs `lt continue` or `lt abort`")]
    RebaseInterrupted(String),

    #[error("a rebase continuation is already queued for '{0}'")]
    RescuedRebase(String),

    #[error("branch '{0}' depends on an unsubmitted base branch")]
    UnsubmittedBase(String),

    #[error("Lattice has not been initialized in this repository; run `lt init`")]
    Uninitialized,

    #[error("concurrent update detected after retrying")]
    ConcurrentUpdate,

    #[error("repository is in an unexpected state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("forge error: {0}")]
    Forge(String),
}

impl From<ForgeError> for CoreError {
    fn from(err: ForgeError) -> Self {
        CoreError::Forge(err.to_string())
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Uninitialized => CoreError::Uninitialized,
            RepositoryError::NotFound(name) => CoreError::NotFound(name),
            RepositoryError::IsTrunk(name) => {
                CoreError::Forbidden(format!("'{name}' is the trunk branch"))
            }
            RepositoryError::EmptyBase => {
                CoreError::Unprocessable("a branch record must have a non-empty base name".into())
            }
            RepositoryError::Store(e) => CoreError::Store(e),
            RepositoryError::Corrupt { path, message } => {
                CoreError::InvalidState(format!("corrupt record at '{path}': {message}"))
            }
        }
    }
}

impl From<ContinuationError> for CoreError {
    fn from(err: ContinuationError) -> Self {
        match err {
            ContinuationError::Store(e) => CoreError::Store(e),
            ContinuationError::Corrupt(message) => {
                CoreError::InvalidState(format!("corrupt continuation stack: {message}"))
            }
        }
    }
}

impl CoreError {
    /// The coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::UntrackedBranch(_) => ErrorKind::UntrackedBranch,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Forbidden(_) => ErrorKind::Forbidden,
            CoreError::Unprocessable(_) => ErrorKind::Unprocessable,
            CoreError::AlreadyRestacked(_) => ErrorKind::AlreadyRestacked,
            CoreError::RebaseInterrupted(_) => ErrorKind::RebaseInterrupted,
            CoreError::RescuedRebase(_) => ErrorKind::RescuedRebase,
            CoreError::UnsubmittedBase(_) => ErrorKind::UnsubmittedBase,
            CoreError::Uninitialized => ErrorKind::Uninitialized,
            CoreError::ConcurrentUpdate => ErrorKind::ConcurrentUpdate,
            CoreError::InvalidState(_) => ErrorKind::InvalidState,
            CoreError::Store(StoreError::ConcurrentUpdate(_)) => ErrorKind::ConcurrentUpdate,
            CoreError::Store(_) => ErrorKind::StoreError,
            CoreError::Git(GitError::CasFailed { .. }) => ErrorKind::ConcurrentUpdate,
            CoreError::Git(GitError::OperationInProgress { .. })
            | CoreError::Git(GitError::DirtyWorktree { .. }) => ErrorKind::InvalidState,
            CoreError::Git(_) => ErrorKind::StoreError,
            CoreError::Graph(_) => ErrorKind::Unprocessable,
            CoreError::Forge(_) => ErrorKind::ForgeError,
        }
    }

    /// True if this error's kind matches `kind`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_branch_kind() {
        let err = CoreError::UntrackedBranch("feature".into());
        assert!(err.is(ErrorKind::UntrackedBranch));
    }

    #[test]
    fn concurrent_update_from_store() {
        let err: CoreError = StoreError::ConcurrentUpdate(5).into();
        assert_eq!(err.kind(), ErrorKind::ConcurrentUpdate);
    }

    #[test]
    fn already_restacked_kind() {
        let err = CoreError::AlreadyRestacked("feature".into());
        assert!(err.is(ErrorKind::AlreadyRestacked));
        assert!(!err.is(ErrorKind::UntrackedBranch));
    }

    #[test]
    fn repository_uninitialized_maps_to_uninitialized() {
        let err: CoreError = RepositoryError::Uninitialized.into();
        assert!(err.is(ErrorKind::Uninitialized));
    }

    #[test]
    fn repository_is_trunk_maps_to_forbidden() {
        let err: CoreError = RepositoryError::IsTrunk("main".into()).into();
        assert!(err.is(ErrorKind::Forbidden));
    }

    #[test]
    fn continuation_corrupt_maps_to_invalid_state() {
        let err: CoreError = ContinuationError::Corrupt("bad json".into()).into();
        assert!(err.is(ErrorKind::InvalidState));
    }

    #[test]
    fn forge_error_maps_to_forge_error_kind() {
        let err: CoreError = ForgeError::RateLimited.into();
        assert!(err.is(ErrorKind::ForgeError));
    }
}
