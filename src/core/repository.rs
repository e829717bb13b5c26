//! core::repository
//!
//! The Branch Repository (C3): typed access to the repo record and branch
//! records persisted in [`crate::core::store`]. This module holds no state
//! of its own beyond a reference to the underlying [`Store`] - every read
//! goes straight through to the ref, and every write is a single
//! compare-and-swap [`crate::core::store::Update`].

use serde::{Deserialize, Serialize};

use crate::core::store::{Store, StoreError, Update};
use crate::core::types::BranchName;
use crate::git::Git;

/// The repo record, keyed `repo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RepoRecord {
    pub trunk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forge_id: Option<String>,
}

/// `base` field of a [`BranchRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchBase {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// `upstream` field of a [`BranchRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchUpstream {
    pub branch: String,
}

/// `change` field of a [`BranchRecord`] - an opaque, Forge-specific CR link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeMetadata {
    pub forge: String,
    pub metadata: serde_json::Value,
}

/// One tracked branch, keyed `branches/<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchRecord {
    pub base: BranchBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<BranchUpstream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeMetadata>,
}

/// A recoverable draft of a CR title/body, keyed `prepared/<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreparedBranch {
    pub subject: String,
    pub body: String,
}

/// A merge-semantics patch applied by [`Tx::upsert`].
///
/// Every field is `None` by default, meaning "leave the prior value
/// untouched". Where a field is itself optional in the stored record
/// (`upstream`, `change`), `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct BranchPatch {
    pub base_name: Option<String>,
    pub base_hash: Option<Option<String>>,
    pub upstream_branch: Option<Option<String>>,
    pub change: Option<Option<ChangeMetadata>>,
}

impl BranchPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, name: impl Into<String>, hash: Option<String>) -> Self {
        self.base_name = Some(name.into());
        self.base_hash = Some(hash);
        self
    }

    pub fn base_hash(mut self, hash: impl Into<String>) -> Self {
        self.base_hash = Some(Some(hash.into()));
        self
    }

    pub fn upstream_branch(mut self, branch: impl Into<String>) -> Self {
        self.upstream_branch = Some(Some(branch.into()));
        self
    }

    pub fn clear_upstream(mut self) -> Self {
        self.upstream_branch = Some(None);
        self
    }

    pub fn change(mut self, change: ChangeMetadata) -> Self {
        self.change = Some(Some(change));
        self
    }

    pub fn clear_change(mut self) -> Self {
        self.change = Some(None);
        self
    }
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Lattice has not been initialized in this repository; run `lt init`")]
    Uninitialized,

    #[error("branch '{0}' not found")]
    NotFound(String),

    #[error("'{0}' is the trunk branch and cannot be tracked as a branch record")]
    IsTrunk(String),

    #[error("a branch record must have a non-empty base name")]
    EmptyBase,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("corrupt record at '{path}': {message}")]
    Corrupt { path: String, message: String },
}

const REPO_KEY: &str = "repo";

fn branch_key(name: &str) -> String {
    format!("branches/{name}")
}

fn prepared_key(name: &str) -> String {
    format!("prepared/{name}")
}

/// Typed access to the repo record and branch records.
pub struct Repository<'a> {
    store: Store<'a>,
}

impl<'a> Repository<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self {
            store: Store::new(git),
        }
    }

    /// The trunk branch name.
    ///
    /// # Errors
    /// [`RepositoryError::Uninitialized`] if no repo record exists yet.
    pub fn trunk(&self) -> Result<BranchName, RepositoryError> {
        let record = self.repo_record()?;
        BranchName::new(&record.trunk).map_err(|e| RepositoryError::Corrupt {
            path: REPO_KEY.to_string(),
            message: e.to_string(),
        })
    }

    /// The full repo record.
    pub fn repo_record(&self) -> Result<RepoRecord, RepositoryError> {
        match self.store.get_string(REPO_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| RepositoryError::Corrupt {
                path: REPO_KEY.to_string(),
                message: e.to_string(),
            }),
            None => Err(RepositoryError::Uninitialized),
        }
    }

    /// Whether Lattice has been initialized in this repository.
    pub fn is_initialized(&self) -> Result<bool, RepositoryError> {
        Ok(self.store.get_string(REPO_KEY)?.is_some())
    }

    /// Create or overwrite the repo record. Used only by `init`.
    pub fn init(&self, record: &RepoRecord) -> Result<(), RepositoryError> {
        let body = serde_json::to_vec_pretty(record).expect("RepoRecord always serializes");
        self.store
            .update(Update::new().write(REPO_KEY, body), "lattice: init")?;
        Ok(())
    }

    /// Look up a single branch record.
    pub fn lookup(&self, name: &BranchName) -> Result<Option<BranchRecord>, RepositoryError> {
        let key = branch_key(name.as_str());
        match self.store.get_string(&key)? {
            Some(raw) => {
                let record: BranchRecord =
                    serde_json::from_str(&raw).map_err(|e| RepositoryError::Corrupt {
                        path: key.clone(),
                        message: e.to_string(),
                    })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// All tracked branch names, sorted lexicographically.
    pub fn list(&self) -> Result<Vec<BranchName>, RepositoryError> {
        let mut names = Vec::new();
        for key in self.store.keys("branches")? {
            let Some(name) = key.strip_prefix("branches/") else {
                continue;
            };
            let branch = BranchName::new(name).map_err(|e| RepositoryError::Corrupt {
                path: key.clone(),
                message: e.to_string(),
            })?;
            names.push(branch);
        }
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }

    /// Load the recoverable CR draft for `name`, if any.
    pub fn load_prepared(&self, name: &BranchName) -> Result<Option<PreparedBranch>, RepositoryError> {
        let key = prepared_key(name.as_str());
        match self.store.get_string(&key)? {
            Some(raw) => {
                let prepared: PreparedBranch =
                    serde_json::from_str(&raw).map_err(|e| RepositoryError::Corrupt {
                        path: key.clone(),
                        message: e.to_string(),
                    })?;
                Ok(Some(prepared))
            }
            None => Ok(None),
        }
    }

    /// Save a recoverable CR draft for `name`.
    pub fn save_prepared(
        &self,
        name: &BranchName,
        prepared: &PreparedBranch,
    ) -> Result<(), RepositoryError> {
        let body = serde_json::to_vec_pretty(prepared).expect("PreparedBranch always serializes");
        self.store.update(
            Update::new().write(prepared_key(name.as_str()), body),
            &format!("lattice: prepare {}", name.as_str()),
        )?;
        Ok(())
    }

    /// Clear a previously saved CR draft for `name`.
    pub fn clear_prepared(&self, name: &BranchName) -> Result<(), RepositoryError> {
        self.store.update(
            Update::new().delete(prepared_key(name.as_str())),
            &format!("lattice: clear prepared {}", name.as_str()),
        )?;
        Ok(())
    }

    /// Begin a transaction accumulating upserts/deletes to commit together.
    pub fn begin_tx(&self) -> Tx<'_, 'a> {
        Tx {
            repo: self,
            upserts: Vec::new(),
            deletes: Vec::new(),
        }
    }

    /// Build the in-memory [`StackGraph`] from every tracked branch's
    /// recorded base. Branches whose base is trunk contribute no parent
    /// edge, matching [`crate::core::graph::StackGraph`]'s convention that
    /// trunk itself is never a node.
    pub fn graph(&self) -> Result<crate::core::graph::StackGraph, RepositoryError> {
        let trunk = self.trunk()?;
        let mut graph = crate::core::graph::StackGraph::new();
        for name in self.list()? {
            let record = self.lookup(&name)?.ok_or_else(|| RepositoryError::Corrupt {
                path: branch_key(name.as_str()),
                message: "listed but missing".to_string(),
            })?;
            let base = BranchName::new(&record.base.name).map_err(|e| RepositoryError::Corrupt {
                path: branch_key(name.as_str()),
                message: e.to_string(),
            })?;
            if base != trunk {
                graph.add_edge(name, base);
            } else {
                graph.ensure_node(name);
            }
        }
        Ok(graph)
    }
}

/// Accumulates branch upserts/deletes, committed together as one [`Update`].
pub struct Tx<'r, 'a> {
    repo: &'r Repository<'a>,
    upserts: Vec<(BranchName, BranchPatch)>,
    deletes: Vec<BranchName>,
}

impl<'r, 'a> Tx<'r, 'a> {
    /// Queue a merge-semantics upsert. Validated at `commit` time.
    pub fn upsert(mut self, name: BranchName, patch: BranchPatch) -> Self {
        self.upserts.push((name, patch));
        self
    }

    /// Queue a branch record deletion.
    pub fn delete(mut self, name: BranchName) -> Self {
        self.deletes.push(name);
        self
    }

    /// Validate and commit all queued changes as a single store update.
    pub fn commit(self, message: &str) -> Result<(), RepositoryError> {
        let trunk = self.repo.trunk()?;
        let mut update = Update::new();

        for (name, patch) in &self.upserts {
            if *name == trunk {
                return Err(RepositoryError::IsTrunk(name.as_str().to_string()));
            }

            let existing = self.repo.lookup(name)?;
            let merged = merge_patch(existing, patch)?;
            let body = serde_json::to_vec_pretty(&merged).expect("BranchRecord always serializes");
            update = update.write(branch_key(name.as_str()), body);
        }

        for name in &self.deletes {
            update = update.delete(branch_key(name.as_str()));
        }

        if update.is_empty() {
            return Ok(());
        }

        self.repo
            .store
            .update(update, message)
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}

fn merge_patch(
    existing: Option<BranchRecord>,
    patch: &BranchPatch,
) -> Result<BranchRecord, RepositoryError> {
    let mut record = existing.unwrap_or(BranchRecord {
        base: BranchBase {
            name: String::new(),
            hash: None,
        },
        upstream: None,
        change: None,
    });

    if let Some(name) = &patch.base_name {
        record.base.name = name.clone();
    }
    if let Some(hash) = &patch.base_hash {
        record.base.hash = hash.clone();
    }
    if record.base.name.is_empty() {
        return Err(RepositoryError::EmptyBase);
    }

    if let Some(upstream) = &patch.upstream_branch {
        record.upstream = upstream.clone().map(|branch| BranchUpstream { branch });
    }
    if let Some(change) = &patch.change {
        record.change = change.clone();
    }

    Ok(record)
}
