//! branch submit command - reconcile a branch with its change request.

use anyhow::{Context as _, Result};

use crate::core::repository::Repository;
use crate::engine::restack::{self, Request, Scope};
use crate::engine::submit::{self, HeadMismatchPolicy, SubmitOutcome, SubmitRequest};
use crate::engine::Context;
use crate::forge::{create_forge, Reviewers};

use super::common::{acquire_lock, load_config, open_git, resolve_branch, resolve_github_token};

#[allow(clippy::too_many_arguments)]
pub fn submit(
    ctx: &Context,
    branch: Option<&str>,
    draft: bool,
    no_draft: bool,
    title: Option<&str>,
    body: Option<&str>,
    reviewer: &[String],
    team_reviewer: &[String],
    label: &[String],
    assignee: &[String],
    force: bool,
    update_only: bool,
    no_restack: bool,
    no_publish: bool,
) -> Result<()> {
    let (cwd, git) = open_git(ctx)?;
    let repo = Repository::new(&git);
    let target = resolve_branch(&git, branch)?;
    let config = load_config(&cwd)?;

    let _lock = acquire_lock(&git)?;

    if !no_restack {
        let request = Request {
            branch: target.clone(),
            scope: Scope::Downstack,
            continue_command: vec!["branch".into(), "submit".into()],
        };
        match restack::run(&git, &repo, request) {
            Ok(_) => {}
            Err(e) if e.is(crate::core::errors::ErrorKind::RebaseInterrupted) => {
                println!();
                println!("{e}");
                return Ok(());
            }
            Err(e) => return Err(e).context("pre-submit restack failed"),
        }
    }

    let remote = config.remote().to_string();
    let remote_url = git
        .remote_url(&remote)?
        .ok_or_else(|| anyhow::anyhow!("no '{remote}' remote configured"))?;
    let token = resolve_github_token()?;
    let forge = create_forge(&remote_url, &token, Some(config.default_forge()))
        .context("failed to resolve forge provider")?;

    let draft = if draft {
        Some(true)
    } else if no_draft {
        Some(false)
    } else {
        None
    };

    let request = SubmitRequest {
        branch: target.clone(),
        remote: &remote,
        draft,
        title: title.map(str::to_string),
        body: body.map(str::to_string),
        reviewers: Reviewers {
            users: reviewer.to_vec(),
            teams: team_reviewer.to_vec(),
        },
        labels: label.to_vec(),
        assignees: assignee.to_vec(),
        force,
        update_only,
        publish: !no_publish,
        no_verify: !ctx.verify,
        on_head_mismatch: if force {
            HeadMismatchPolicy::Ignore
        } else {
            HeadMismatchPolicy::Prompt
        },
    };

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let outcome = rt
        .block_on(submit::run(&git, &repo, forge.as_ref(), request))
        .context("submit failed")?;

    if !ctx.quiet {
        print_outcome(&target, &outcome);
    }
    Ok(())
}

fn print_outcome(branch: &crate::core::types::BranchName, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Created { number, url } => {
            println!("created #{number} for '{branch}': {url}")
        }
        SubmitOutcome::Updated { number, url, changed } => {
            println!(
                "updated #{number} for '{branch}' ({}): {url}",
                changed.join(", ")
            )
        }
        SubmitOutcome::UpToDate { number, url } => {
            println!("#{number} for '{branch}' already up to date: {url}")
        }
        SubmitOutcome::SkippedUpdateOnly => {
            println!("skipped '{branch}': no existing change request, --update-only set")
        }
        SubmitOutcome::SkippedUnpublished { upstream_branch } => {
            println!("pushed '{branch}' to '{upstream_branch}'; no change request created (--no-publish)")
        }
    }
}
