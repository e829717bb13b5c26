//! forge::gitlab
//!
//! GitLab forge stub implementation.
//!
//! # Design
//!
//! This module provides a stub implementation of the `Forge` trait for GitLab.
//! All operations return `ForgeError::NotImplemented` to demonstrate the
//! multi-forge architecture without implementing actual GitLab API calls.
//!
//! Per ROADMAP.md Milestone 10, this stub:
//! - Compiles and is selectable in config
//! - Returns stable, actionable errors
//! - Proves the architecture boundary (core depends on Forge trait, not GitHub)
//!
//! # Feature Flag
//!
//! This module is only available when the `gitlab` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! lattice = { version = "0.1", features = ["gitlab"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lattice::forge::gitlab::GitLabForge;
//! use lattice::forge::{Forge, CreatePrRequest};
//!
//! let forge = GitLabForge::new("token", "owner", "repo");
//!
//! // All operations return NotImplemented
//! let result = forge.create_pr(request).await;
//! assert!(matches!(result, Err(ForgeError::NotImplemented(_))));
//! ```

use async_trait::async_trait;

use super::traits::{
    CreatePrRequest, Forge, ForgeError, MergeMethod, PullRequest, Reviewers, UpdatePrRequest,
};

/// GitLab forge stub implementation.
///
/// This is a placeholder that returns `NotImplemented` for all operations.
/// It exists to demonstrate the multi-forge architecture and validate that
/// commands work correctly with forge selection.
#[derive(Debug, Clone)]
pub struct GitLabForge {
    /// Personal access token for authentication
    token: String,
    /// Project owner (user or group)
    owner: String,
    /// Project name
    project: String,
    /// API base URL (for self-hosted GitLab)
    api_base: String,
}

/// Default GitLab API base URL.
const DEFAULT_API_BASE: &str = "https://gitlab.com/api/v4";

impl GitLabForge {
    /// Create a new GitLab forge.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token
    /// * `owner` - Project owner (user or group)
    /// * `project` - Project name
    ///
    /// # Example
    ///
    /// ```
    /// use lattice::forge::gitlab::GitLabForge;
    ///
    /// let forge = GitLabForge::new("glpat-xxx", "mygroup", "myproject");
    /// ```
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            project: project.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a GitLab forge with a custom API base URL.
    ///
    /// Use this for self-hosted GitLab installations.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token
    /// * `owner` - Project owner
    /// * `project` - Project name
    /// * `api_base` - Custom API base URL (e.g., `https://gitlab.example.com/api/v4`)
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        project: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            project: project.into(),
            api_base: api_base.into(),
        }
    }

    /// Create a GitLab forge from a remote URL.
    ///
    /// Parses the remote URL to extract owner and project.
    ///
    /// # Arguments
    ///
    /// * `url` - Git remote URL (SSH or HTTPS format)
    /// * `token` - Personal access token
    ///
    /// # Returns
    ///
    /// `Some(GitLabForge)` if URL is parseable as GitLab, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use lattice::forge::gitlab::GitLabForge;
    ///
    /// // SSH format
    /// let forge = GitLabForge::from_remote_url("git@gitlab.com:owner/project.git", "token");
    /// assert!(forge.is_some());
    ///
    /// // HTTPS format
    /// let forge = GitLabForge::from_remote_url("https://gitlab.com/owner/project.git", "token");
    /// assert!(forge.is_some());
    ///
    /// // Not a GitLab URL
    /// let forge = GitLabForge::from_remote_url("git@github.com:owner/repo.git", "token");
    /// assert!(forge.is_none());
    /// ```
    pub fn from_remote_url(url: &str, token: impl Into<String>) -> Option<Self> {
        let (owner, project) = parse_gitlab_url(url)?;
        Some(Self::new(token, owner, project))
    }

    /// Get the project owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Check if the forge has a token configured.
    ///
    /// Note: The token is stored but not used since all operations
    /// return NotImplemented.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

#[async_trait]
impl Forge for GitLabForge {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn create_pr(&self, _request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab merge request creation is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn update_pr(&self, _request: UpdatePrRequest) -> Result<PullRequest, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab merge request updates are not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn get_pr(&self, _number: u64) -> Result<PullRequest, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab merge request retrieval is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn find_pr_by_head(&self, _head: &str) -> Result<Option<PullRequest>, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab merge request search is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn set_draft(&self, _number: u64, _draft: bool) -> Result<(), ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab draft status toggling is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn request_reviewers(
        &self,
        _number: u64,
        _reviewers: Reviewers,
    ) -> Result<(), ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab reviewer requests are not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn merge_pr(&self, _number: u64, _method: MergeMethod) -> Result<(), ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab merge request merging is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn list_open_prs(
        &self,
        _opts: super::traits::ListPullsOpts,
    ) -> Result<super::traits::ListPullsResult, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab open merge request listing is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }

    async fn list_closed_prs_targeting(
        &self,
        _opts: super::traits::ListClosedPrsOpts,
    ) -> Result<super::traits::ListPullsResult, ForgeError> {
        Err(ForgeError::NotImplemented(
            "GitLab closed merge request listing is not yet implemented. \
             See https://github.com/lattice-cli/lattice for updates."
                .to_string(),
        ))
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitLab remote URL to extract owner and project.
///
/// Supports both SSH and HTTPS formats:
/// - `git@gitlab.com:owner/project.git`
/// - `https://gitlab.com/owner/project.git`
/// - `https://gitlab.com/owner/project`
/// - Nested groups: `git@gitlab.com:group/subgroup/project.git`
///
/// # Returns
///
/// `Some((owner, project))` if the URL is a valid GitLab URL, `None` otherwise.
/// For nested groups, owner includes the full path (e.g., "group/subgroup").
///
/// # Example
///
/// ```
/// use lattice::forge::gitlab::parse_gitlab_url;
///
/// let (owner, project) = parse_gitlab_url("git@gitlab.com:mygroup/myproject.git").unwrap();
/// assert_eq!(owner, "mygroup");
/// assert_eq!(project, "myproject");
///
/// // Nested groups
/// let (owner, project) = parse_gitlab_url("git@gitlab.com:group/subgroup/project.git").unwrap();
/// assert_eq!(owner, "group/subgroup");
/// assert_eq!(project, "project");
/// ```
pub fn parse_gitlab_url(url: &str) -> Option<(String, String)> {
    // SSH format: git@gitlab.com:owner/project.git
    if let Some(rest) = url.strip_prefix("git@gitlab.com:") {
        return parse_gitlab_path(rest);
    }

    // HTTPS format: https://gitlab.com/owner/project.git
    if let Some(rest) = url
        .strip_prefix("https://gitlab.com/")
        .or_else(|| url.strip_prefix("http://gitlab.com/"))
    {
        return parse_gitlab_path(rest);
    }

    None
}

/// Parse the path portion of a GitLab URL.
///
/// Handles nested groups by treating all but the last segment as the owner.
fn parse_gitlab_path(path: &str) -> Option<(String, String)> {
    let path = path.strip_suffix(".git").unwrap_or(path);

    // Split by '/' and ensure at least owner/project
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return None;
    }

    // Last part is project, everything before is owner (handles nested groups)
    let project = parts.last()?.to_string();
    if project.is_empty() {
        return None;
    }

    let owner = parts[..parts.len() - 1].join("/");
    if owner.is_empty() {
        return None;
    }

    Some((owner, project))
}
