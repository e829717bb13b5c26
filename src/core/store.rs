//! core::store
//!
//! Content-addressed metadata store backed by a single dedicated git ref.
//!
//! # Architecture
//!
//! Rather than one ref per tracked branch (an older `refs/branch-metadata/*`
//! scheme), all Lattice state lives under a tree
//! committed to a single ref: `refs/lattice/data`. Each commit on that ref is
//! a snapshot; the tree's blob entries are the individual keys. Writers never
//! touch the working directory or the index — the whole thing is built out of
//! [`crate::git::Git`]'s tree/object primitives.
//!
//! # Concurrency
//!
//! Every mutation reads the current ref, builds a new tree and commit on top
//! of it, and attempts a compare-and-swap ref update. If the ref moved in the
//! meantime the update is retried from scratch against the new state, up to
//! [`MAX_CAS_RETRIES`] times, after which the caller sees
//! [`StoreError::ConcurrentUpdate`].

use thiserror::Error;

use crate::core::types::Oid;
use crate::git::{Git, GitError};

/// The ref under which all Lattice metadata lives.
pub const DATA_REF: &str = "refs/lattice/data";

/// Number of compare-and-swap retries before giving up.
pub const MAX_CAS_RETRIES: u32 = 5;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ref moved under us more times than we were willing to retry.
    #[error("concurrent update to {DATA_REF} after {0} retries")]
    ConcurrentUpdate(u32),

    /// Underlying git operation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A key was not valid UTF-8 when read back as a string.
    #[error("stored value at {0} is not valid utf-8")]
    InvalidUtf8(String),
}

/// A single write in an [`Update`].
#[derive(Debug, Clone)]
pub struct Write {
    /// Slash-separated path under the data tree.
    pub path: String,
    /// Raw bytes to store.
    pub content: Vec<u8>,
}

/// A batch of writes and deletes to apply atomically.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub writes: Vec<Write>,
    pub deletes: Vec<String>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.writes.push(Write {
            path: path.into(),
            content: content.into(),
        });
        self
    }

    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.deletes.push(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }
}

/// Handle onto the single-ref metadata store.
pub struct Store<'a> {
    git: &'a Git,
}

impl<'a> Store<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self { git }
    }

    /// Current tip commit of the data ref, if it has ever been written.
    fn head(&self) -> Result<Option<Oid>, StoreError> {
        match self.git.try_resolve_ref(DATA_REF)? {
            Some(oid) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Read the raw bytes at `path`, or `None` if the key doesn't exist.
    pub fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(head) = self.head()? else {
            return Ok(None);
        };
        let Some(blob_oid) = self.git.blob_at(&head, path)? else {
            return Ok(None);
        };
        Ok(Some(self.git.read_blob(&blob_oid)?))
    }

    /// Read the value at `path` as a UTF-8 string.
    pub fn get_string(&self, path: &str) -> Result<Option<String>, StoreError> {
        match self.get(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8(path.to_string())),
            None => Ok(None),
        }
    }

    /// List all keys (full paths) under `prefix`.
    ///
    /// `prefix` may be empty to list every key in the store. Only blob
    /// entries are returned; intermediate tree nodes are descended into
    /// transparently.
    pub fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let Some(head) = self.head()? else {
            return Ok(Vec::new());
        };
        let tree_oid = self.git.tree_of_commit(&head)?;

        let mut out = Vec::new();
        self.walk_keys(&tree_oid, "", &mut out)?;

        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Ok(out);
        }
        Ok(out
            .into_iter()
            .filter(|k| k == prefix || k.starts_with(&format!("{prefix}/")))
            .collect())
    }

    fn walk_keys(&self, tree_oid: &Oid, prefix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
        for entry in self.git.list_tree(tree_oid)? {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };
            match entry.kind {
                crate::git::TreeEntryKind::Blob => out.push(path),
                crate::git::TreeEntryKind::Tree => self.walk_keys(&entry.oid, &path, out)?,
            }
        }
        Ok(())
    }

    /// Apply `update` atomically, retrying on concurrent modification.
    pub fn update(&self, update: Update, message: &str) -> Result<Oid, StoreError> {
        if update.is_empty() {
            if let Some(head) = self.head()? {
                return Ok(head);
            }
            return self.clear(message);
        }

        let mut attempt = 0;
        loop {
            let expected_old = self.head()?;

            let mut writes = Vec::with_capacity(update.writes.len());
            for w in &update.writes {
                let blob_oid = self.git.write_blob(&w.content)?;
                writes.push((w.path.clone(), blob_oid));
            }

            let new_tree = self
                .git
                .update_tree(expected_old.as_ref(), &writes, &update.deletes)?;

            let parents: Vec<Oid> = expected_old.iter().cloned().collect();
            let new_commit = self.git.commit_tree(&new_tree, &parents, message)?;

            match self
                .git
                .update_ref_cas(DATA_REF, &new_commit, expected_old.as_ref(), message)
            {
                Ok(()) => return Ok(new_commit),
                Err(GitError::CasFailed { .. }) => {
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        return Err(StoreError::ConcurrentUpdate(attempt));
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drop every key in the store, leaving an empty commit behind.
    pub fn clear(&self, message: &str) -> Result<Oid, StoreError> {
        let mut attempt = 0;
        loop {
            let expected_old = self.head()?;
            let Some(old) = expected_old.clone() else {
                return Err(StoreError::Git(GitError::RefNotFound {
                    refname: DATA_REF.to_string(),
                }));
            };

            let empty_tree = self.git.update_tree(None, &[], &[])?;
            let new_commit = self.git.commit_tree(&empty_tree, &[old], message)?;

            match self
                .git
                .update_ref_cas(DATA_REF, &new_commit, expected_old.as_ref(), message)
            {
                Ok(()) => return Ok(new_commit),
                Err(GitError::CasFailed { .. }) => {
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        return Err(StoreError::ConcurrentUpdate(attempt));
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
