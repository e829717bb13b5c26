//! restack commands - `branch restack`, `upstack/downstack/stack restack`,
//! `repo restack`.

use anyhow::{Context as _, Result};

use crate::core::errors::ErrorKind;
use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::restack::{self, Request, Scope};
use crate::engine::Context;

use super::common::{acquire_lock, open_git, resolve_branch};

/// `branch restack` - restack a single branch.
pub fn branch(ctx: &Context, branch: Option<&str>) -> Result<()> {
    run_scope(ctx, branch, Scope::Branch, vec!["branch".into(), "restack".into()])
}

/// `upstack restack` - the branch and everything above it.
pub fn upstack(ctx: &Context, branch: Option<&str>) -> Result<()> {
    run_scope(ctx, branch, Scope::Upstack, vec!["upstack".into(), "restack".into()])
}

/// `downstack restack` - the branch and everything below it, up to trunk.
pub fn downstack(ctx: &Context, branch: Option<&str>) -> Result<()> {
    run_scope(
        ctx,
        branch,
        Scope::Downstack,
        vec!["downstack".into(), "restack".into()],
    )
}

/// `stack restack` - every branch transitively connected to the given one.
pub fn stack(ctx: &Context, branch: Option<&str>) -> Result<()> {
    run_scope(ctx, branch, Scope::Stack, vec!["stack".into(), "restack".into()])
}

/// `repo restack` - every tracked stack rooted on trunk.
pub fn repo(ctx: &Context) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repository = Repository::new(&git);
    let trunk = repository.trunk()?;
    let graph = repository.graph()?;

    let mut roots: Vec<BranchName> = graph
        .branches()
        .filter(|b| graph.parent(b).is_none())
        .cloned()
        .collect();
    roots.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    if roots.is_empty() {
        if !ctx.quiet {
            println!("no tracked branches");
        }
        return Ok(());
    }

    let _lock = acquire_lock(&git)?;
    for root in roots {
        if root == trunk {
            continue;
        }
        let request = Request {
            branch: root.clone(),
            scope: Scope::Upstack,
            continue_command: vec!["repo".into(), "restack".into()],
        };
        if !run_request(ctx, &git, &repository, request)? {
            return Ok(());
        }
    }

    if !ctx.quiet {
        println!("restack complete");
    }
    Ok(())
}

fn run_scope(
    ctx: &Context,
    branch: Option<&str>,
    scope: Scope,
    continue_command: Vec<String>,
) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let target = resolve_branch(&git, branch)?;

    let _lock = acquire_lock(&git)?;
    let request = Request {
        branch: target,
        scope,
        continue_command,
    };

    if run_request(ctx, &git, &repo, request)? && !ctx.quiet {
        println!("restack complete");
    }
    Ok(())
}

/// Runs one restack request. Returns `Ok(true)` if it completed, `Ok(false)`
/// if it was paused on an interrupted rebase (message already printed).
fn run_request(
    ctx: &Context,
    git: &crate::git::Git,
    repo: &Repository<'_>,
    request: Request,
) -> Result<bool> {
    match restack::run(git, repo, request) {
        Ok(result) => {
            if !ctx.quiet {
                for (branch, outcome) in &result.branches {
                    print_outcome(branch, outcome);
                }
            }
            Ok(true)
        }
        Err(e) if e.is(ErrorKind::RebaseInterrupted) => {
            println!();
            println!("{e}");
            Ok(false)
        }
        Err(e) => Err(e).context("restack failed"),
    }
}

fn print_outcome(branch: &BranchName, outcome: &crate::engine::restack::BranchOutcome) {
    use crate::engine::restack::BranchOutcome::*;
    match outcome {
        Restacked { new_head } => println!("restacked '{branch}' onto {new_head}"),
        AlreadyRestacked => println!("'{branch}' already restacked"),
        SkippedCheckedOutElsewhere => {
            println!("skipped '{branch}' (checked out in another worktree)")
        }
    }
}
