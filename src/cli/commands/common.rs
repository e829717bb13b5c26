//! cli::commands::common
//!
//! Shared helpers used by every command handler: opening the repository,
//! resolving an explicit-or-current branch argument, acquiring the mutation
//! lock, and loading merged config.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::ops::lock::RepoLock;
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::git::Git;

/// Resolve the working directory and open the repository at it.
pub fn open_git(ctx: &Context) -> Result<(PathBuf, Git)> {
    let cwd = ctx
        .resolve_cwd()
        .context("failed to resolve working directory")?;
    let git = Git::open(&cwd).context("not a Lattice-compatible git repository")?;
    Ok((cwd, git))
}

/// Resolve an explicit branch argument, or the current branch if `branch`
/// is `None`. Fails on detached HEAD when no branch was named.
pub fn resolve_branch(git: &Git, branch: Option<&str>) -> Result<BranchName> {
    match branch {
        Some(name) => BranchName::new(name).context("invalid branch name"),
        None => git
            .current_branch()?
            .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly")),
    }
}

/// Acquire the exclusive repository lock for the duration of a mutating
/// command. Every command that writes to the branch store or runs a rebase
/// holds this for its whole execution.
pub fn acquire_lock(git: &Git) -> Result<RepoLock> {
    RepoLock::acquire(git.git_dir()).context("another Lattice command is already running here")
}

/// Load merged global + repo config rooted at `cwd`.
pub fn load_config(cwd: &Path) -> Result<Config> {
    Ok(Config::load(Some(cwd))
        .context("failed to load configuration")?
        .config)
}

/// Resolve a forge API token from the environment.
///
/// Checked in order: `LATTICE_GITHUB_TOKEN`, then `GITHUB_TOKEN`.
pub fn resolve_github_token() -> Result<String> {
    std::env::var("LATTICE_GITHUB_TOKEN")
        .or_else(|_| std::env::var("GITHUB_TOKEN"))
        .context("no GitHub token found; set LATTICE_GITHUB_TOKEN or GITHUB_TOKEN")
}
