//! log command - display tracked branches in stack layout.

use anyhow::{Context as _, Result};

use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::git::Git;

use super::common::open_git;

pub fn log(
    ctx: &Context,
    short: bool,
    long: bool,
    stack: bool,
    all: bool,
    reverse: bool,
) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let graph = repo.graph()?;
    let current = git.current_branch()?;

    let mut branches: Vec<BranchName> = if all {
        let mut all: Vec<BranchName> = graph.branches().cloned().collect();
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all
    } else if let Some(current) = current.as_ref().filter(|_| stack || !all) {
        let mut in_stack = graph.stack(current);
        if in_stack.is_empty() {
            in_stack.push(current.clone());
        }
        in_stack
    } else {
        let mut all: Vec<BranchName> = graph.branches().cloned().collect();
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all
    };

    // `stack`/`branches` already order trunk-to-leaf; `--reverse` flips that.
    if reverse {
        branches.reverse();
    }

    if branches.is_empty() {
        if !ctx.quiet {
            println!("no tracked branches");
        }
        return Ok(());
    }

    for branch in &branches {
        let is_current = current.as_ref() == Some(branch);
        let prefix = if is_current { "* " } else { "  " };

        if short {
            println!("{prefix}{branch}");
            continue;
        }

        let record = repo.lookup(branch)?;
        let parent = graph.parent(branch);

        if long {
            println!("{prefix}{branch}");
            if let Some(p) = parent {
                println!("    parent: {p}");
            } else {
                println!("    parent: {}", repo.trunk()?);
            }
            if let Some(record) = &record {
                println!("    base: {}", short_oid(&record.base.hash));
                if let Some(change) = &record.change {
                    println!("    change: {} ({})", change.forge, describe_change(change));
                }
            }
            println!("    commits: {}", commit_count_label(&git, branch, parent)?);
        } else {
            let parent_str = parent
                .map(|p| format!(" (on {p})"))
                .unwrap_or_else(|| format!(" (on {})", repo.trunk().unwrap_or_else(|_| branch.clone())));
            let change_str = record
                .as_ref()
                .and_then(|r| r.change.as_ref())
                .map(|c| format!(" [{}]", c.forge))
                .unwrap_or_default();
            println!("{prefix}{branch}{parent_str}{change_str}");
        }
    }

    Ok(())
}

fn short_oid(hash: &Option<String>) -> &str {
    match hash {
        Some(h) => &h[..h.len().min(12)],
        None => "(unrecorded)",
    }
}

fn describe_change(change: &crate::core::repository::ChangeMetadata) -> String {
    change
        .metadata
        .get("number")
        .map(|n| format!("#{n}"))
        .unwrap_or_else(|| "linked".to_string())
}

fn commit_count_label(
    git: &Git,
    branch: &BranchName,
    parent: Option<&BranchName>,
) -> Result<String> {
    let Some(parent) = parent else {
        return Ok("-".to_string());
    };
    let base = git
        .try_resolve_ref(&format!("refs/heads/{parent}"))
        .context("failed to resolve parent branch")?;
    let tip = git
        .try_resolve_ref(&format!("refs/heads/{branch}"))
        .context("failed to resolve branch")?;
    match (base, tip) {
        (Some(base), Some(tip)) => Ok(git.commit_count(&base, &tip)?.to_string()),
        _ => Ok("-".to_string()),
    }
}
