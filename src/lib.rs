//! Lattice - a CLI for stacked branches and change requests
//!
//! Lattice tracks a branch graph on top of plain git, keeps it restacked as
//! ancestors change, and reconciles each branch with its change request on a
//! remote forge.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Restack, rebase-rescue, and submit orchestration
//! - [`core`] - Domain types, the metadata store, branch graph, and errors
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - Abstraction for remote forges (GitHub, GitLab)
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! Lattice maintains the following invariants:
//!
//! 1. The branch graph is always acyclic; cycles are rejected at the edges.
//! 2. Metadata mutations go through compare-and-swap ref updates, never a
//!    blind overwrite.
//! 3. A rebase that stops for conflicts is recorded as a continuation, never
//!    silently dropped.
//! 4. Force pushes to a forge-tracked branch use `--force-with-lease` unless
//!    the user explicitly asks for plain `--force`.

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod ui;
