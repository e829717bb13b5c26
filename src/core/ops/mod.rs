//! core::ops
//!
//! Process-level coordination for Lattice commands.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive repository lock
//!
//! # Architecture
//!
//! Every mutating command acquires the exclusive repo lock before touching
//! the branch graph or the metadata store, and releases it on drop. Crash
//! safety for in-flight mutations comes from the CAS-guarded ref updates in
//! [`crate::core::store`], not from a separate journal: a ref update either
//! lands atomically or it doesn't, so there is nothing left half-written to
//! roll back.

pub mod lock;

pub use lock::{LockError, RepoLock};
