//! init command - initialize Lattice in this repository.

use anyhow::{bail, Context as _, Result};

use crate::core::config::{Config, RepoConfig};
use crate::core::repository::{RepoRecord, Repository};
use crate::core::types::BranchName;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

use super::common::open_git;

pub fn run(ctx: &Context, trunk: Option<&str>, force: bool) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let (cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);

    if repo.is_initialized()? && !force {
        bail!("Lattice is already initialized in this repository; pass --force to reinitialize");
    }

    let trunk_name = resolve_trunk(&git, trunk)?;
    let remote = git.default_remote()?;

    repo.init(&RepoRecord {
        trunk: trunk_name.as_str().to_string(),
        remote: remote.clone(),
        forge_id: None,
    })?;

    Config::write_repo(
        &cwd,
        &RepoConfig {
            trunk: Some(trunk_name.as_str().to_string()),
            remote,
            ..Default::default()
        },
    )
    .context("failed to write repo config")?;

    output::success(
        &format!("Initialized Lattice with trunk '{trunk_name}'"),
        verbosity,
    );
    Ok(())
}

/// Resolve the trunk branch: the explicit `--trunk`, validated against local
/// branches, or a `main`/`master` guess.
fn resolve_trunk(git: &crate::git::Git, trunk: Option<&str>) -> Result<BranchName> {
    let branches = git.list_branches()?;

    if let Some(name) = trunk {
        let branch = BranchName::new(name).context("invalid trunk branch name")?;
        if !branches.contains(&branch) {
            bail!("branch '{name}' does not exist");
        }
        return Ok(branch);
    }

    for candidate in ["main", "master"] {
        if let Some(found) = branches.iter().find(|b| b.as_str() == candidate) {
            return Ok(found.clone());
        }
    }

    bail!("no trunk specified and neither 'main' nor 'master' exists; pass --trunk explicitly")
}
