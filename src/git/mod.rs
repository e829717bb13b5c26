//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. Direct parsing of `.git` internal files
//! outside this module is prohibited. No other module should import `git2`.
//!
//! Object, ref, and ancestry queries go through `git2`. Rebase and push are
//! driven by shelling out to the `git` binary instead: git2's rebase API
//! doesn't surface conflict state the way the CLI's exit codes and
//! `.git/rebase-merge` bookkeeping do, and safe force-with-lease pushes are
//! a thin wrapper around `git push` flags that isn't worth reimplementing
//! against the smart-HTTP/SSH transport directly.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Ref operations (read, CAS update, delete)
//! - Object operations (read/write blob, tree, commit)
//! - Ancestry and diff queries (merge-base, is-ancestor, diff-index, merge-tree)
//! - Rebase and push (via the `git` binary)
//! - Status and state detection
//! - Remote URL and refspec parsing
//!
//! # Invariants
//!
//! - All ref updates use CAS (compare-and-swap) semantics
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, BranchName, RefName)
//!
//! # Example
//!
//! ```ignore
//! use lattice::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//!
//! // Query operations
//! let oid = git.resolve_ref("refs/heads/main")?;
//! let branches = git.list_branches()?;
//!
//! // CAS update (fails if ref changed since read)
//! git.update_ref_cas(
//!     "refs/branch-metadata/feature",
//!     &new_oid,
//!     Some(&old_oid),
//!     "lattice: update metadata"
//! )?;
//! ```

mod interface;

pub use interface::{
    CommitInfo, Git, GitError, GitState, PushRequest, RebaseInterruptKind, RebaseOutcome,
    RebaseRequest, RefEntry, RepoContext, RepoInfo, TreeEntry, TreeEntryKind, WorktreeStatus,
};
