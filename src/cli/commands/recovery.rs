//! continue and abort commands - resume or cancel an interrupted rebase.

use std::process::Command as ProcessCommand;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use crate::cli::args::Cli;
use crate::core::continuation::{Continuation, ContinuationStack};
use crate::core::repository::{BranchPatch, Repository};
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::git::{Git, RebaseOutcome};

use super::common::{acquire_lock, open_git};

/// Continue a rebase that was interrupted by conflicts, then resume any
/// queued continuation.
pub fn continue_op(ctx: &Context, all: bool) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let stack = ContinuationStack::new(&git);
    let queued = stack.list().context("failed to read continuation stack")?;

    if !git.state().is_in_progress() {
        if queued.is_empty() {
            bail!("no rebase in progress and nothing queued to continue");
        }
        return resume_queued(ctx, &git, &stack);
    }

    let Some(entry) = queued.first() else {
        bail!("a rebase is in progress but Lattice queued no continuation for it; resolve it with plain git");
    };
    let branch = BranchName::new(&entry.branch).context("corrupt continuation: invalid branch name")?;

    if all {
        run_git(&git, &["add", "-A"])?;
    }

    let _lock = acquire_lock(&git)?;
    match git.rebase_continue(&branch)? {
        RebaseOutcome::Success { new_head } => {
            record_new_base(&git, &branch, &new_head)?;
            if !ctx.quiet {
                println!("rebase of '{branch}' completed");
            }
            resume_queued(ctx, &git, &stack)?;
        }
        RebaseOutcome::Interrupted { .. } => {
            println!();
            println!("conflicts remain in '{branch}'; resolve them and run `lattice continue` again");
        }
    }

    Ok(())
}

/// Abort an interrupted rebase and discard any queued continuation.
pub fn abort(ctx: &Context) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let stack = ContinuationStack::new(&git);

    if git.state().is_in_progress() {
        git.rebase_abort().context("git rebase --abort failed")?;
    }

    let drained = stack
        .take_all("lattice: abort")
        .context("failed to clear continuation stack")?;

    if !ctx.quiet {
        if drained.is_empty() {
            println!("aborted");
        } else {
            println!("aborted; discarded {} queued operation(s)", drained.len());
        }
    }
    Ok(())
}

fn record_new_base(git: &Git, branch: &BranchName, new_head: &crate::core::types::Oid) -> Result<()> {
    let repo = Repository::new(git);
    let Some(record) = repo.lookup(branch)? else {
        return Ok(());
    };
    let base_name = BranchName::new(&record.base.name).context("corrupt base branch name")?;
    let base_head = git.resolve_ref(&format!("refs/heads/{base_name}"))?;
    let _ = new_head;
    repo.begin_tx()
        .upsert(branch.clone(), BranchPatch::new().base_hash(base_head.as_str()))
        .commit(&format!("lattice: restack {branch} (continued)"))?;
    Ok(())
}

/// Drain the continuation stack and re-run each queued CLI invocation.
fn resume_queued(ctx: &Context, git: &Git, stack: &ContinuationStack<'_>) -> Result<()> {
    let entries = stack
        .take_all("lattice: resume continuation")
        .context("failed to drain continuation stack")?;

    for Continuation { command, branch, message } in entries {
        if !ctx.quiet {
            println!("resuming '{branch}': {message}");
        }
        let argv = std::iter::once("lattice".to_string()).chain(command);
        let cli = Cli::try_parse_from(argv).context("failed to re-parse queued continuation")?;
        super::dispatch(cli.command, ctx)?;
    }
    Ok(())
}

fn run_git(git: &Git, args: &[&str]) -> Result<()> {
    let work_dir = git
        .info()?
        .work_dir
        .ok_or_else(|| anyhow::anyhow!("repository has no working directory"))?;
    let status = ProcessCommand::new("git")
        .args(args)
        .current_dir(work_dir)
        .status()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !status.success() {
        bail!("git {} failed", args.join(" "));
    }
    Ok(())
}
