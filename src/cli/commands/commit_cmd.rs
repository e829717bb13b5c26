//! commit fixup/pick - amend or extend the current branch, then restack
//! everything above it.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context as _, Result};

use crate::core::repository::Repository;
use crate::engine::restack::{self, Request, Scope};
use crate::engine::Context;

use super::common::{acquire_lock, open_git, resolve_branch};

/// Amend the current branch's tip commit, then restack descendants onto it.
pub fn fixup(ctx: &Context, all: bool, update: bool, patch: bool) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let work_dir = work_dir(&git)?;

    stage(&work_dir, all, update, patch)?;

    let mut args = vec!["commit", "--amend", "--no-edit"];
    if !ctx.verify {
        args.push("--no-verify");
    }
    run_git(&work_dir, &args)?;

    restack_descendants(ctx, &git, vec!["upstack".into(), "restack".into()])
}

/// Create a new commit on the current branch, then restack descendants.
pub fn pick(ctx: &Context, message: &str, all: bool, update: bool, patch: bool) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let work_dir = work_dir(&git)?;

    stage(&work_dir, all, update, patch)?;

    let mut args = vec!["commit", "-m", message];
    if !ctx.verify {
        args.push("--no-verify");
    }
    run_git(&work_dir, &args)?;

    restack_descendants(ctx, &git, vec!["upstack".into(), "restack".into()])
}

fn stage(work_dir: &Path, all: bool, update: bool, patch: bool) -> Result<()> {
    if patch {
        run_git(work_dir, &["add", "-p"])?;
    } else if all {
        run_git(work_dir, &["add", "-A"])?;
    } else if update {
        run_git(work_dir, &["add", "-u"])?;
    }
    Ok(())
}

fn restack_descendants(
    ctx: &Context,
    git: &crate::git::Git,
    continue_command: Vec<String>,
) -> Result<()> {
    let repo = Repository::new(git);
    let branch = resolve_branch(git, None)?;

    if repo.lookup(&branch)?.is_none() {
        return Ok(());
    }

    let _lock = acquire_lock(git)?;
    let request = Request {
        branch,
        scope: Scope::UpstackExclusive,
        continue_command,
    };

    match restack::run(git, &repo, request) {
        Ok(result) => {
            if !ctx.quiet {
                for (branch, outcome) in &result.branches {
                    print_outcome(branch, outcome);
                }
            }
            Ok(())
        }
        Err(e) if e.is(crate::core::errors::ErrorKind::RebaseInterrupted) => {
            println!();
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(e).context("restack of descendants failed"),
    }
}

fn print_outcome(branch: &crate::core::types::BranchName, outcome: &restack::BranchOutcome) {
    use restack::BranchOutcome::*;
    match outcome {
        Restacked { new_head } => println!("restacked '{branch}' onto {new_head}"),
        AlreadyRestacked => println!("'{branch}' already restacked"),
        SkippedCheckedOutElsewhere => {
            println!("skipped '{branch}' (checked out in another worktree)")
        }
    }
}

fn work_dir(git: &crate::git::Git) -> Result<std::path::PathBuf> {
    git.info()?
        .work_dir
        .ok_or_else(|| anyhow::anyhow!("repository has no working directory"))
}

fn run_git(work_dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(work_dir)
        .status()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !status.success() {
        bail!("git {} failed", args.join(" "));
    }
    Ok(())
}
