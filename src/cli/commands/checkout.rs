//! checkout command - check out a branch.

use anyhow::{bail, Context as _, Result};

use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::ui::prompts;

use super::common::open_git;

pub fn run(ctx: &Context, branch: Option<&str>, trunk_flag: bool) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);

    let target = if trunk_flag {
        repo.trunk()?
    } else if let Some(name) = branch {
        BranchName::new(name).context("invalid branch name")?
    } else {
        pick_from_current_stack(&git, &repo, ctx.interactive)?
    };

    if target != repo.trunk()? && repo.lookup(&target)?.is_none() {
        bail!("branch '{target}' is not tracked by Lattice");
    }

    git.checkout(&target)?;
    Ok(())
}

/// Without an explicit branch, offer the current stack for selection.
fn pick_from_current_stack(
    git: &crate::git::Git,
    repo: &Repository<'_>,
    interactive: bool,
) -> Result<BranchName> {
    let current = git
        .current_branch()?
        .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly"))?;

    let trunk = repo.trunk()?;
    if current == trunk {
        bail!("on trunk; specify a branch explicitly");
    }

    let graph = repo.graph()?;
    let mut candidates = graph.stack(&current);
    candidates.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    if candidates.is_empty() {
        bail!("'{current}' is not tracked by Lattice");
    }

    let idx = prompts::select(
        "Check out which branch?",
        &candidates.iter().map(|b| b.as_str().to_string()).collect::<Vec<_>>(),
        None,
        interactive,
    )
    .context("branch selection failed")?;

    Ok(candidates[idx].clone())
}
