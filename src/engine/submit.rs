//! engine::submit
//!
//! The Submit Pipeline (C9): reconciles one tracked branch with its change
//! request on a remote forge. Creates a CR the first time a branch is
//! submitted, updates it in place on every later submit, and records the
//! link back onto the branch through [`crate::core::repository::Repository`]
//! so later submits (and `restack`'s base-hash bookkeeping) can find it
//! again without asking the forge.
//!
//! # Architecture
//!
//! [`run`] never talks to git2 or the forge's HTTP client directly; it goes
//! through [`crate::git::Git`] for the push and a `&dyn` [`crate::forge::Forge`]
//! for everything forge-side, so the pipeline itself stays testable against
//! [`crate::forge::mock::MockForge`] without a network.
//!
//! The pipeline never force-pushes plainly unless the caller explicitly
//! asked for it (`SubmitRequest::force`); the default push is
//! force-with-lease bound to the last commit this process observed at
//! `refs/remotes/<remote>/<upstream>`.

use serde::{Deserialize, Serialize};

use crate::core::errors::CoreError;
use crate::core::naming::upstream_under_remote;
use crate::core::repository::{BranchPatch, ChangeMetadata, PreparedBranch, Repository};
use crate::core::types::{BranchName, RefName};
use crate::forge::{CreatePrRequest, Forge, PullRequest, Reviewers, UpdatePrRequest};
use crate::git::{Git, PushRequest};

/// How submit treats a CR discovered under a tentative head name whose
/// last-known head commit doesn't match the local branch tip.
///
/// The pipeline itself cannot block on a terminal prompt (that's a UI-layer
/// concern); `Prompt` instead refuses with a message telling the caller to
/// re-run with `--force` once they've confirmed the reuse by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadMismatchPolicy {
    /// Treat the mismatch as "no usable CR found" and create a new one.
    #[default]
    Ignore,
    /// Refuse unless the caller passed `--force`.
    Prompt,
}

/// The `change.metadata` shape recorded for GitHub CRs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubChangeMetadata {
    pub number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub url: String,
}

/// A submit request for one tracked branch.
pub struct SubmitRequest<'a> {
    /// The branch to submit.
    pub branch: BranchName,
    /// Remote to push to and create the CR against (e.g. `origin`).
    pub remote: &'a str,
    /// Create as a draft. `None` leaves draft state alone on update.
    pub draft: Option<bool>,
    /// CR title override. Falls back to a prepared draft, then the first
    /// commit's subject, then the branch name.
    pub title: Option<String>,
    /// CR body override.
    pub body: Option<String>,
    /// Reviewers to request. Requests are additive; submit never removes
    /// reviewers already requested on an existing CR.
    pub reviewers: Reviewers,
    /// Full replacement label set to apply.
    pub labels: Vec<String>,
    /// Full replacement assignee set to apply.
    pub assignees: Vec<String>,
    /// Skip the restacked check and allow reusing a head-mismatched CR.
    pub force: bool,
    /// Only update a CR that already exists; never create one.
    pub update_only: bool,
    /// Search the Forge for, and create, a change request. When `false`,
    /// submit still pushes the branch but never searches for or creates a
    /// CR; a CR already recorded on the branch is still updated.
    pub publish: bool,
    /// Push with `--no-verify`.
    pub no_verify: bool,
    /// How to treat a tentative-name CR whose head doesn't match ours.
    pub on_head_mismatch: HeadMismatchPolicy,
}

/// What submit did for one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No CR existed; one was created.
    Created { number: u64, url: String },
    /// A CR existed and at least one field was changed.
    Updated {
        number: u64,
        url: String,
        changed: Vec<&'static str>,
    },
    /// A CR existed and already matched; nothing was pushed or edited.
    UpToDate { number: u64, url: String },
    /// `update_only` was set and no CR exists yet; nothing was done.
    SkippedUpdateOnly,
    /// `publish` was disabled and no CR exists yet; the branch was pushed
    /// but no CR was searched for or created.
    SkippedUnpublished { upstream_branch: String },
}

/// Run the Submit Pipeline for one branch.
pub async fn run(
    git: &Git,
    repo: &Repository<'_>,
    forge: &dyn Forge,
    request: SubmitRequest<'_>,
) -> Result<SubmitOutcome, CoreError> {
    let trunk = repo.trunk()?;
    if request.branch == trunk {
        return Err(CoreError::Forbidden(
            "the trunk branch cannot be submitted".to_string(),
        ));
    }

    let record = repo
        .lookup(&request.branch)?
        .ok_or_else(|| CoreError::UntrackedBranch(request.branch.as_str().to_string()))?;

    let base_name = BranchName::new(&record.base.name).map_err(crate::git::GitError::from)?;
    let base_head = git.resolve_ref(&RefName::for_branch(&base_name).to_string())?;
    let branch_tip = git.resolve_ref(&RefName::for_branch(&request.branch).to_string())?;

    if !request.force && !is_restacked(git, &record, &base_head, &branch_tip)? {
        return Err(CoreError::Unprocessable(format!(
            "branch '{}' is not restacked onto '{}'; run `lt branch restack` first or pass --force",
            request.branch.as_str(),
            base_name.as_str()
        )));
    }

    let upstream_base = resolve_upstream_base(repo, &trunk, &base_name)?;
    let upstream_branch = resolve_upstream_branch(git, forge, &request, &record).await?;

    tracing::debug!(
        branch = %request.branch,
        upstream = %upstream_branch,
        base = %upstream_base,
        "submitting branch"
    );

    let existing = discover_existing(forge, &record, &upstream_branch, &branch_tip, &request).await?;

    match existing {
        Some(pr) => {
            update_existing(git, repo, forge, &request, &upstream_branch, pr).await
        }
        None => {
            if request.update_only {
                return Ok(SubmitOutcome::SkippedUpdateOnly);
            }
            if !request.publish {
                push_refspec(git, &request, &request.branch, &upstream_branch)?;
                return Ok(SubmitOutcome::SkippedUnpublished {
                    upstream_branch,
                });
            }
            create_new(
                git,
                repo,
                forge,
                &request,
                &base_head,
                &branch_tip,
                &upstream_branch,
                &upstream_base,
            )
            .await
        }
    }
}

/// A branch is restacked, for submit's purposes, when its recorded base
/// hash matches the base's current tip and that tip is still an ancestor
/// of the branch.
fn is_restacked(
    git: &Git,
    record: &crate::core::repository::BranchRecord,
    current_base_head: &crate::core::types::Oid,
    branch_tip: &crate::core::types::Oid,
) -> Result<bool, CoreError> {
    let Some(recorded) = &record.base.hash else {
        return Ok(false);
    };
    if recorded != current_base_head.as_str() {
        return Ok(false);
    }
    Ok(git.is_ancestor(current_base_head, branch_tip)?)
}

/// Resolve the branch name the CR's base should target: the repo's
/// configured trunk name, or - if the base is itself a tracked branch - the
/// base's own recorded upstream, since a local base name means nothing on
/// the forge.
fn resolve_upstream_base(
    repo: &Repository<'_>,
    trunk: &BranchName,
    base_name: &BranchName,
) -> Result<String, CoreError> {
    if base_name == trunk {
        return Ok(trunk.as_str().to_string());
    }
    let base_record = repo
        .lookup(base_name)?
        .ok_or_else(|| CoreError::UntrackedBranch(base_name.as_str().to_string()))?;
    match base_record.upstream {
        Some(upstream) => Ok(upstream.branch),
        None => Err(CoreError::UnsubmittedBase(base_name.as_str().to_string())),
    }
}

/// Resolve the branch name to push to and submit against: the recorded
/// upstream if this branch has been submitted before, else a VCS-configured
/// upstream that sits under the target remote, else a forge-negotiated
/// unused name derived from the local branch name.
async fn resolve_upstream_branch(
    git: &Git,
    forge: &dyn Forge,
    request: &SubmitRequest<'_>,
    record: &crate::core::repository::BranchRecord,
) -> Result<String, CoreError> {
    if let Some(upstream) = &record.upstream {
        return Ok(upstream.branch.clone());
    }

    if let Some(configured) = git.branch_upstream(&request.branch)? {
        if let Some(name) = upstream_under_remote(&configured, request.remote) {
            return Ok(name.to_string());
        }
    }

    Ok(forge.unused_branch_name(request.branch.as_str()).await?)
}

/// Find a CR already associated with this branch, either through the
/// recorded `change` link or (on first submit) a forge-side search by head
/// branch name.
async fn discover_existing(
    forge: &dyn Forge,
    record: &crate::core::repository::BranchRecord,
    upstream_branch: &str,
    branch_tip: &crate::core::types::Oid,
    request: &SubmitRequest<'_>,
) -> Result<Option<PullRequest>, CoreError> {
    if let Some(change) = &record.change {
        let meta: GitHubChangeMetadata = serde_json::from_value(change.metadata.clone())
            .map_err(|e| CoreError::InvalidState(format!("corrupt change metadata: {e}")))?;
        return Ok(Some(forge.get_pr(meta.number).await?));
    }

    if !request.publish {
        return Ok(None);
    }

    let Some(found) = forge.find_pr_by_head(upstream_branch).await? else {
        return Ok(None);
    };

    let matches_head = match &found.head_sha {
        Some(sha) => sha == branch_tip.as_str(),
        None => true,
    };
    if matches_head || request.force {
        return Ok(Some(found));
    }

    match request.on_head_mismatch {
        HeadMismatchPolicy::Ignore => Ok(None),
        HeadMismatchPolicy::Prompt => Err(CoreError::Unprocessable(format!(
            "found CR #{} for head '{}' but its last known commit doesn't match this branch's tip; \
             re-run with --force to reuse it",
            found.number, upstream_branch
        ))),
    }
}

fn push_refspec(
    git: &Git,
    request: &SubmitRequest<'_>,
    branch: &BranchName,
    upstream_branch: &str,
) -> Result<(), CoreError> {
    let refspec = format!("{}:{}", branch.as_str(), upstream_branch);
    let remote_ref = format!("refs/remotes/{}/{}", request.remote, upstream_branch);
    let expected = git.try_resolve_ref_to_object(&remote_ref)?;

    let push_request = if request.force {
        PushRequest {
            remote: request.remote,
            refspec: &refspec,
            force: true,
            force_with_lease: None,
            no_verify: request.no_verify,
        }
    } else {
        PushRequest {
            remote: request.remote,
            refspec: &refspec,
            force: false,
            force_with_lease: expected.as_ref(),
            no_verify: request.no_verify,
        }
    };

    Ok(git.push(push_request)?)
}

/// Does `refspec`'s source side cover `target_ref`?
///
/// Fetch refspecs look like `[+]<src>:<dst>`, where `<src>` may end in a
/// `*` wildcard (e.g. `refs/heads/*`).
fn refspec_covers(refspec: &str, target_ref: &str) -> bool {
    let spec = refspec.strip_prefix('+').unwrap_or(refspec);
    let Some((src, _dst)) = spec.split_once(':') else {
        return false;
    };
    match src.strip_suffix('*') {
        Some(prefix) => target_ref.starts_with(prefix),
        None => src == target_ref,
    }
}

/// Verify that pushing to `upstream_branch` will actually be fetchable back
/// under `refs/remotes/<remote>/...` afterwards, per the remote's configured
/// fetch refspecs.
fn verify_fetch_refspec_covers(
    git: &Git,
    request: &SubmitRequest<'_>,
    upstream_branch: &str,
) -> Result<(), CoreError> {
    if request.force {
        return Ok(());
    }

    let target_ref = format!("refs/heads/{upstream_branch}");
    let refspecs = git.remote_fetch_refspecs(request.remote)?;
    if refspecs.iter().any(|r| refspec_covers(r, &target_ref)) {
        return Ok(());
    }

    Err(CoreError::Unprocessable(format!(
        "remote '{}' has no fetch refspec that would bring '{target_ref}' back after pushing; \
         add one (e.g. `git config remote.{}.fetch '+refs/heads/*:refs/remotes/{}/*'`) or pass --force",
        request.remote, request.remote, request.remote
    )))
}

async fn create_new(
    git: &Git,
    repo: &Repository<'_>,
    forge: &dyn Forge,
    request: &SubmitRequest<'_>,
    base_head: &crate::core::types::Oid,
    branch_tip: &crate::core::types::Oid,
    upstream_branch: &str,
    upstream_base: &str,
) -> Result<SubmitOutcome, CoreError> {
    let (title, body) = resolve_title_and_body(git, repo, forge, request, base_head, branch_tip).await?;

    verify_fetch_refspec_covers(git, request, upstream_branch)?;
    push_refspec(git, request, &request.branch, upstream_branch)?;

    let pr = forge
        .create_pr(CreatePrRequest {
            head: upstream_branch.to_string(),
            base: upstream_base.to_string(),
            title,
            body: Some(body),
            draft: request.draft.unwrap_or(false),
            labels: request.labels.clone(),
            assignees: request.assignees.clone(),
        })
        .await?;

    if !request.reviewers.is_empty() {
        forge
            .request_reviewers(pr.number, request.reviewers.clone())
            .await?;
    }

    record_change(repo, &request.branch, upstream_branch, forge.name(), &pr)?;
    repo.clear_prepared(&request.branch)?;

    tracing::info!(branch = %request.branch, number = pr.number, url = %pr.url, "created CR");

    Ok(SubmitOutcome::Created {
        number: pr.number,
        url: pr.url,
    })
}

async fn update_existing(
    git: &Git,
    repo: &Repository<'_>,
    forge: &dyn Forge,
    request: &SubmitRequest<'_>,
    upstream_branch: &str,
    existing: PullRequest,
) -> Result<SubmitOutcome, CoreError> {
    push_refspec(git, request, &request.branch, upstream_branch)?;

    let mut changed = Vec::new();
    let mut update = UpdatePrRequest {
        number: existing.number,
        ..Default::default()
    };

    if let Some(title) = &request.title {
        if *title != existing.title {
            update.title = Some(title.clone());
            changed.push("title");
        }
    }
    if let Some(body) = &request.body {
        if Some(body) != existing.body.as_ref() {
            update.body = Some(body.clone());
            changed.push("body");
        }
    }
    if !request.labels.is_empty() && request.labels != existing.labels {
        update.labels = Some(request.labels.clone());
        changed.push("labels");
    }
    if !request.assignees.is_empty() && request.assignees != existing.assignees {
        update.assignees = Some(request.assignees.clone());
        changed.push("assignees");
    }

    let pr = if changed.is_empty() {
        existing.clone()
    } else {
        forge.update_pr(update).await?
    };

    if let Some(draft) = request.draft {
        if draft != pr.is_draft {
            forge.set_draft(pr.number, draft).await?;
            changed.push("draft");
        }
    }

    if !request.reviewers.is_empty() {
        forge
            .request_reviewers(pr.number, request.reviewers.clone())
            .await?;
        changed.push("reviewers");
    }

    record_change(repo, &request.branch, upstream_branch, forge.name(), &pr)?;

    if changed.is_empty() {
        tracing::debug!(branch = %request.branch, number = pr.number, "CR already up to date");
        Ok(SubmitOutcome::UpToDate {
            number: pr.number,
            url: pr.url,
        })
    } else {
        tracing::info!(branch = %request.branch, number = pr.number, ?changed, "updated CR");
        Ok(SubmitOutcome::Updated {
            number: pr.number,
            url: pr.url,
            changed,
        })
    }
}

/// Pick a title and body: the explicit request fields win, then a
/// previously prepared (recoverable) draft, then the first commit's
/// subject/body in the branch's range over its base, then the Forge's CR
/// template (if any), then a generic fallback derived from the branch name.
async fn resolve_title_and_body(
    git: &Git,
    repo: &Repository<'_>,
    forge: &dyn Forge,
    request: &SubmitRequest<'_>,
    base_head: &crate::core::types::Oid,
    branch_tip: &crate::core::types::Oid,
) -> Result<(String, String), CoreError> {
    if let (Some(title), Some(body)) = (&request.title, &request.body) {
        return Ok((title.clone(), body.clone()));
    }

    let prepared = repo.load_prepared(&request.branch)?;
    let commits = git.commit_message_range(base_head, branch_tip)?;
    let (fallback_title, fallback_body) = match (prepared, commits.first()) {
        (Some(PreparedBranch { subject, body }), _) => (subject, body),
        (None, Some(first)) => (
            first.summary.clone(),
            first
                .message
                .strip_prefix(&first.summary)
                .unwrap_or("")
                .trim()
                .to_string(),
        ),
        (None, None) => (request.branch.as_str().to_string(), String::new()),
    };

    let fallback_body = if fallback_body.is_empty() && request.body.is_none() {
        forge
            .list_change_templates()
            .await?
            .into_iter()
            .next()
            .unwrap_or(fallback_body)
    } else {
        fallback_body
    };

    Ok((
        request.title.clone().unwrap_or(fallback_title),
        request.body.clone().unwrap_or(fallback_body),
    ))
}

fn record_change(
    repo: &Repository<'_>,
    branch: &BranchName,
    upstream_branch: &str,
    forge_name: &str,
    pr: &PullRequest,
) -> Result<(), CoreError> {
    let metadata = serde_json::to_value(GitHubChangeMetadata {
        number: pr.number,
        node_id: pr.node_id.clone(),
        url: pr.url.clone(),
    })
    .expect("GitHubChangeMetadata always serializes");

    repo.begin_tx()
        .upsert(
            branch.clone(),
            BranchPatch::new()
                .upstream_branch(upstream_branch)
                .change(ChangeMetadata {
                    forge: forge_name.to_string(),
                    metadata,
                }),
        )
        .commit(&format!("lattice: submit {}", branch.as_str()))?;
    Ok(())
}
