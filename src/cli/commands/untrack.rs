//! untrack command - stop tracking a branch.

use anyhow::{bail, Context as _, Result};

use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::ui::prompts;

use super::common::{acquire_lock, open_git};

pub fn untrack(ctx: &Context, branch: Option<&str>, force: bool) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);

    let target = match branch {
        Some(name) => BranchName::new(name).context("invalid branch name")?,
        None => git
            .current_branch()?
            .ok_or_else(|| anyhow::anyhow!("HEAD is detached; specify a branch explicitly"))?,
    };

    if repo.lookup(&target)?.is_none() {
        if !ctx.quiet {
            println!("'{target}' is not tracked");
        }
        return Ok(());
    }

    let graph = repo.graph()?;
    let mut descendants: Vec<BranchName> = graph.descendants(&target).into_iter().collect();
    descendants.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    if !descendants.is_empty() && !force {
        if ctx.interactive {
            println!(
                "'{target}' has {} descendant(s) that will also be untracked:",
                descendants.len()
            );
            for d in &descendants {
                println!("  - {d}");
            }
            let proceed = prompts::confirm("continue?", false, ctx.interactive)
                .context("confirmation failed")?;
            if !proceed {
                println!("aborted");
                return Ok(());
            }
        } else {
            bail!(
                "'{target}' has {} descendant(s); pass --force to untrack all",
                descendants.len()
            );
        }
    }

    let _lock = acquire_lock(&git)?;
    let mut tx = repo.begin_tx().delete(target.clone());
    for d in &descendants {
        tx = tx.delete(d.clone());
    }
    tx.commit(&format!("lattice: untrack {target}"))?;

    if !ctx.quiet {
        println!("untracked '{target}'");
        for d in &descendants {
            println!("untracked '{d}'");
        }
    }

    Ok(())
}
