//! config command - get, set, or list configuration values.

use anyhow::{bail, Context as _, Result};

use crate::core::config::Config;
use crate::core::types::BranchName;
use crate::engine::Context;

use super::common::open_git;

pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let (cwd, _git) = open_git(ctx)?;
    let config = super::common::load_config(&cwd)?;

    let value = match key {
        "trunk" => config.trunk().map(str::to_string),
        "remote" => Some(config.remote().to_string()),
        _ => bail!("unknown configuration key '{key}'"),
    };

    if let Some(value) = value {
        println!("{value}");
    }
    Ok(())
}

pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let (cwd, _git) = open_git(ctx)?;
    let mut repo_config = super::common::load_config(&cwd)?.repo.unwrap_or_default();

    match key {
        "trunk" => {
            BranchName::new(value).context("invalid branch name")?;
            repo_config.trunk = Some(value.to_string());
        }
        "remote" => {
            if value.is_empty() {
                bail!("remote cannot be empty");
            }
            repo_config.remote = Some(value.to_string());
        }
        _ => bail!("unknown configuration key '{key}'"),
    }

    Config::write_repo(&cwd, &repo_config).context("failed to write config")?;

    if !ctx.quiet {
        println!("{key} = {value}");
    }
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let (cwd, _git) = open_git(ctx)?;
    let config = super::common::load_config(&cwd)?;

    println!("trunk = {}", config.trunk().unwrap_or("(not set)"));
    println!("remote = {}", config.remote());
    Ok(())
}
