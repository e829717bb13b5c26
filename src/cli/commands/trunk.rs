//! trunk command - display or set the trunk branch.

use anyhow::{bail, Context as _, Result};

use crate::core::repository::Repository;
use crate::core::types::BranchName;
use crate::engine::Context;

use super::common::{acquire_lock, open_git};

pub fn run(ctx: &Context, set: Option<&str>) -> Result<()> {
    let (_cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);

    match set {
        Some(name) => {
            let branch = BranchName::new(name).context("invalid branch name")?;
            if !git.list_branches()?.contains(&branch) {
                bail!("branch '{name}' does not exist");
            }
            let _lock = acquire_lock(&git)?;
            let mut record = repo.repo_record()?;
            record.trunk = branch.as_str().to_string();
            repo.init(&record)?;
            if !ctx.quiet {
                println!("trunk set to '{branch}'");
            }
            Ok(())
        }
        None => {
            println!("{}", repo.trunk()?);
            Ok(())
        }
    }
}
