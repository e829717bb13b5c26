//! info command - show tracking status, parent, and diff for a branch.

use std::process::Command;

use anyhow::{bail, Context as _, Result};

use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;

use super::common::open_git;

pub fn info(
    ctx: &Context,
    branch: Option<&str>,
    diff: bool,
    stat: bool,
    patch: bool,
) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);

    let target = match branch {
        Some(name) => BranchName::new(name).context("invalid branch name")?,
        None => git
            .current_branch()?
            .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly"))?,
    };

    if !git.list_branches()?.contains(&target) {
        bail!("branch '{target}' does not exist");
    }

    let trunk = repo.trunk()?;
    let record = repo.lookup(&target)?;

    println!("branch: {target}");
    println!("tracked: {}", if record.is_some() { "yes" } else { "no" });

    if target == trunk {
        println!("trunk: yes");
        return Ok(());
    }

    let Some(record) = record else {
        return Ok(());
    };

    let graph = repo.graph()?;
    match graph.parent(&target) {
        Some(parent) => println!("parent: {parent}"),
        None => println!("parent: {trunk} (trunk)"),
    }
    println!(
        "base: {}",
        record.base.hash.as_deref().unwrap_or("(unrecorded)")
    );

    match &record.change {
        Some(change) => {
            println!("change: {}", change.forge);
            if let Some(number) = change.metadata.get("number") {
                println!("change number: {number}");
            }
            if let Some(url) = change.metadata.get("url").and_then(|v| v.as_str()) {
                println!("change url: {url}");
            }
        }
        None => println!("change: none"),
    }

    if diff || stat || patch {
        let base = match &record.base.hash {
            Some(hash) => hash.clone(),
            None => bail!("'{target}' has no recorded base commit; run restack first"),
        };
        let work_dir = git
            .info()?
            .work_dir
            .ok_or_else(|| anyhow::anyhow!("repository has no working directory"))?;

        if stat {
            println!();
            println!("--- stat against base ---");
            run_git_diff(&work_dir, &base, &target, true)?;
        }
        if diff || patch {
            println!();
            println!("--- diff against base ---");
            run_git_diff(&work_dir, &base, &target, false)?;
        }
    }

    Ok(())
}

fn run_git_diff(
    work_dir: &std::path::Path,
    base: &str,
    branch: &BranchName,
    stat_only: bool,
) -> Result<()> {
    let mut args = vec!["diff"];
    if stat_only {
        args.push("--stat");
    }
    args.push(base);
    let branch_ref = branch.as_str();
    args.push(branch_ref);

    let output = Command::new("git")
        .args(&args)
        .current_dir(work_dir)
        .output()
        .context("failed to run git diff")?;

    if !output.status.success() {
        bail!(
            "git diff failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    print!("{}", String::from_utf8_lossy(&output.stdout));
    Ok(())
}
