//! track command - start tracking a branch.

use anyhow::{bail, Context as _, Result};

use crate::core::repository::{BranchPatch, Repository};
use crate::core::types::{BranchName, Oid};
use crate::engine::Context;
use crate::git::Git;
use crate::ui::prompts;

use super::common::{acquire_lock, open_git};

pub fn track(
    ctx: &Context,
    branch: Option<&str>,
    parent: Option<&str>,
    force: bool,
    _as_frozen: bool,
) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let trunk = repo.trunk()?;

    let target = match branch {
        Some(name) => BranchName::new(name).context("invalid branch name")?,
        None => git
            .current_branch()?
            .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly"))?,
    };

    let branches = git.list_branches()?;
    if !branches.contains(&target) {
        bail!("branch '{target}' does not exist");
    }

    if target == trunk {
        bail!("cannot track trunk branch '{trunk}'");
    }

    if repo.lookup(&target)?.is_some() {
        if !ctx.quiet {
            println!("'{target}' is already tracked");
        }
        return Ok(());
    }

    let parent_branch = resolve_parent(ctx, &git, &repo, &target, &trunk, parent, force)?;

    let target_oid = git.resolve_ref(&format!("refs/heads/{target}"))?;
    let parent_oid = git.resolve_ref(&format!("refs/heads/{parent_branch}"))?;

    let base_oid = git
        .merge_base(&target_oid, &parent_oid)
        .context("failed to compute merge-base")?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "'{target}' shares no history with '{parent_branch}'; cannot compute a base"
            )
        })?;

    let _lock = acquire_lock(&git)?;
    repo.begin_tx()
        .upsert(
            target.clone(),
            BranchPatch::new().base(parent_branch.as_str(), Some(base_oid.to_string())),
        )
        .commit(&format!("lattice: track {target}"))?;

    if !ctx.quiet {
        println!(
            "tracking '{target}' with parent '{parent_branch}' (base {})",
            &base_oid.to_string()[..base_oid.to_string().len().min(12)]
        );
    }

    Ok(())
}

fn resolve_parent(
    ctx: &Context,
    git: &Git,
    repo: &Repository<'_>,
    target: &BranchName,
    trunk: &BranchName,
    parent: Option<&str>,
    force: bool,
) -> Result<BranchName> {
    if let Some(name) = parent {
        let p = BranchName::new(name).context("invalid parent branch name")?;
        if &p != trunk && repo.lookup(&p)?.is_none() {
            bail!("parent '{p}' is not tracked; track it first or pass the trunk branch");
        }
        return Ok(p);
    }

    if force {
        return find_nearest_tracked_ancestor(git, repo, target, trunk);
    }

    if !ctx.interactive {
        bail!("no parent specified; pass --parent, --force, or run interactively");
    }

    let mut candidates = repo.list()?;
    candidates.push(trunk.clone());
    candidates.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    candidates.dedup();

    let labels: Vec<String> = candidates
        .iter()
        .map(|b| {
            if b == trunk {
                format!("{b} (trunk)")
            } else {
                b.as_str().to_string()
            }
        })
        .collect();

    let idx = prompts::select(
        &format!("select parent branch for '{target}'"),
        &labels,
        None,
        ctx.interactive,
    )
    .context("parent selection failed")?;

    Ok(candidates[idx].clone())
}

/// Find the tracked branch (or trunk) with the nearest merge-base to `target`,
/// measured by commit distance from that merge-base to `target`'s tip.
fn find_nearest_tracked_ancestor(
    git: &Git,
    repo: &Repository<'_>,
    target: &BranchName,
    trunk: &BranchName,
) -> Result<BranchName> {
    let target_oid = git.resolve_ref(&format!("refs/heads/{target}"))?;

    let mut candidates = repo.list()?;
    candidates.push(trunk.clone());
    candidates.retain(|b| b != target);

    let mut best: Option<(BranchName, usize)> = None;
    for candidate in candidates {
        let Ok(candidate_oid) = git.resolve_ref(&format!("refs/heads/{candidate}")) else {
            continue;
        };
        let Some(merge_base) = git.merge_base(&target_oid, &candidate_oid)? else {
            continue;
        };
        let distance = commit_distance(git, &merge_base, &target_oid)?;
        if best.as_ref().map(|(_, d)| distance < *d).unwrap_or(true) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(b, _)| b)
        .ok_or_else(|| anyhow::anyhow!("no tracked ancestor found for '{target}'"))
}

fn commit_distance(git: &Git, base: &Oid, tip: &Oid) -> Result<usize> {
    Ok(git.commit_count(base, tip)?)
}
