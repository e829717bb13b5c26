//! navigation commands - up, down, top, bottom.

use anyhow::{bail, Context as _, Result};

use crate::core::graph::StackGraph;
use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::git::Git;
use crate::ui::prompts;

use super::common::open_git;

pub fn up(ctx: &Context, steps: u32) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let current = current_branch(&git)?;
    let graph = repo.graph()?;

    let mut target = current.clone();
    for _ in 0..steps {
        match children_of(&graph, &target) {
            None => {
                report_edge(ctx, "top", &target);
                return finish(ctx, &git, &current, &target);
            }
            Some(kids) if kids.len() == 1 => {
                target = kids[0].clone();
            }
            Some(kids) => {
                target = select_branch(ctx, "Move up to which branch?", &kids)?;
            }
        }
    }

    finish(ctx, &git, &current, &target)
}

pub fn down(ctx: &Context, steps: u32) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let current = current_branch(&git)?;
    let graph = repo.graph()?;

    let mut target = current.clone();
    for _ in 0..steps {
        match graph.parent(&target) {
            Some(parent) => target = parent.clone(),
            None => {
                report_edge(ctx, "bottom", &target);
                return finish(ctx, &git, &current, &target);
            }
        }
    }

    finish(ctx, &git, &current, &target)
}

pub fn top(ctx: &Context) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let current = current_branch(&git)?;
    let graph = repo.graph()?;

    let mut target = current.clone();
    loop {
        match children_of(&graph, &target) {
            None => break,
            Some(kids) if kids.len() == 1 => target = kids[0].clone(),
            Some(kids) => {
                target = select_branch(ctx, "Move to top via which branch?", &kids)?;
            }
        }
    }

    if target == current && !ctx.quiet {
        println!("already at top of stack ({target})");
    }
    finish(ctx, &git, &current, &target)
}

pub fn bottom(ctx: &Context) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let current = current_branch(&git)?;
    let trunk = repo.trunk()?;

    if repo.lookup(&current)?.is_none() && current != trunk {
        bail!("branch '{current}' is not tracked by Lattice");
    }

    let graph = repo.graph()?;
    let mut target = current.clone();
    while let Some(parent) = graph.parent(&target) {
        if *parent == trunk {
            break;
        }
        target = parent.clone();
    }

    if target == current && !ctx.quiet {
        println!("already at bottom of stack ({target})");
    }
    finish(ctx, &git, &current, &target)
}

fn children_of(graph: &StackGraph, branch: &BranchName) -> Option<Vec<BranchName>> {
    let kids = graph.children(branch)?;
    if kids.is_empty() {
        return None;
    }
    let mut kids: Vec<BranchName> = kids.iter().cloned().collect();
    kids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    Some(kids)
}

fn select_branch(ctx: &Context, message: &str, options: &[BranchName]) -> Result<BranchName> {
    if !ctx.interactive {
        bail!(
            "ambiguous move, multiple branches: {}. Run interactively to select.",
            options
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    let names: Vec<String> = options.iter().map(|b| b.as_str().to_string()).collect();
    let idx = prompts::select(message, &names, None, ctx.interactive)
        .context("branch selection failed")?;
    Ok(options[idx].clone())
}

fn current_branch(git: &Git) -> Result<BranchName> {
    git.current_branch()?
        .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly"))
}

fn report_edge(ctx: &Context, edge: &str, branch: &BranchName) {
    if !ctx.quiet {
        println!("already at {edge} of stack ({branch})");
    }
}

fn finish(ctx: &Context, git: &Git, current: &BranchName, target: &BranchName) -> Result<()> {
    if target == current {
        return Ok(());
    }
    git.checkout(target)?;
    if !ctx.quiet {
        println!("{target}");
    }
    Ok(())
}
