//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output
//! - `--verify` / `--no-verify`: Control git hook execution

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lattice - A Rust-native CLI for stacked branches and change requests
#[derive(Parser, Debug)]
#[command(name = "lattice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if lattice was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long, global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Run git hooks (the default)
    #[arg(long, global = true, conflicts_with = "no_verify")]
    pub verify: bool,

    /// Skip git hooks on every underlying git command
    #[arg(long, global = true)]
    pub no_verify: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            // Default: interactive if stdin is a TTY
            atty_check()
        }
    }

    /// Whether git hooks should run. `None` unless `--verify`/`--no-verify`
    /// was given explicitly, leaving the default to the caller.
    pub fn verify_flag(&self) -> Option<bool> {
        if self.no_verify {
            Some(false)
        } else if self.verify {
            Some(true)
        } else {
            None
        }
    }
}

/// Check if stdin is a TTY.
///
/// This is a stub that always returns true for now.
/// Will be properly implemented when we add the `atty` crate.
fn atty_check() -> bool {
    // TODO: Use atty crate or std::io::IsTerminal when stabilized
    true
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize Lattice in this repository
    #[command(name = "init")]
    Init {
        /// Set trunk branch (defaults to the repo's default branch)
        #[arg(long)]
        trunk: Option<String>,

        /// Reinitialize even if Lattice is already set up here
        #[arg(long)]
        force: bool,
    },

    /// Operate on a single tracked branch
    #[command(name = "branch", visible_alias = "b")]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Restack a branch and everything above it
    #[command(name = "upstack", visible_alias = "us")]
    Upstack {
        #[command(subcommand)]
        action: RestackAction,
    },

    /// Restack a branch and everything below it, up to trunk
    #[command(name = "downstack", visible_alias = "ds")]
    Downstack {
        #[command(subcommand)]
        action: RestackAction,
    },

    /// Restack every branch in the stack containing a branch
    #[command(name = "stack")]
    Stack {
        #[command(subcommand)]
        action: RestackAction,
    },

    /// Restack every tracked stack in the repository
    #[command(name = "repo")]
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Continue a rebase that was interrupted, then resume any queued operation
    #[command(name = "continue")]
    Continue,

    /// Abort an interrupted rebase and discard the queued operation
    #[command(name = "abort")]
    Abort,

    /// Display tracked branches in stack layout
    #[command(name = "log", visible_alias = "l")]
    Log {
        /// Short format (branch names only)
        #[arg(short, long)]
        short: bool,

        /// Long format with full details
        #[arg(short, long)]
        long: bool,

        /// Filter to current branch's stack only
        #[arg(long)]
        stack: bool,

        /// Show all tracked branches (default)
        #[arg(short, long)]
        all: bool,

        /// Reverse display order (trunk-adjacent first)
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show tracking status, parent, and change-request link for a branch
    #[command(name = "info")]
    Info {
        /// Branch to show info for (defaults to current)
        branch: Option<String>,

        /// Show diff from base
        #[arg(long)]
        diff: bool,

        /// Show diffstat from base
        #[arg(long)]
        stat: bool,

        /// Show full patch from base
        #[arg(long)]
        patch: bool,
    },

    /// Display or set the trunk branch
    #[command(name = "trunk")]
    Trunk {
        /// Set trunk to this branch
        #[arg(long)]
        set: Option<String>,
    },

    /// Check out a branch
    #[command(name = "checkout", visible_alias = "co")]
    Checkout {
        /// Branch to check out (omit to pick interactively from the current stack)
        branch: Option<String>,

        /// Check out trunk
        #[arg(long)]
        trunk: bool,
    },

    /// Move up to a child branch
    #[command(name = "up")]
    Up {
        /// Number of steps to move
        #[arg(default_value = "1")]
        steps: u32,
    },

    /// Move down to the parent branch
    #[command(name = "down")]
    Down {
        /// Number of steps to move
        #[arg(default_value = "1")]
        steps: u32,
    },

    /// Move to the top of the current stack (the leaf with no tracked children)
    #[command(name = "top")]
    Top,

    /// Move to the bottom of the current stack (the branch rooted on trunk)
    #[command(name = "bottom")]
    Bottom,

    /// Amend the current branch's tip, or add a new commit, then restack everything above it
    #[command(name = "commit", visible_alias = "c")]
    Commit {
        #[command(subcommand)]
        action: CommitAction,
    },

    /// Get, set, or list configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `branch` subcommands.
#[derive(Subcommand, Debug)]
pub enum BranchAction {
    /// Start tracking a branch
    #[command(name = "track")]
    Track {
        /// Branch to track (defaults to current)
        branch: Option<String>,

        /// Parent branch to track against
        #[arg(long, short)]
        parent: Option<String>,

        /// Auto-select the nearest tracked ancestor as parent
        #[arg(long, short)]
        force: bool,
    },

    /// Stop tracking a branch
    #[command(name = "untrack")]
    Untrack {
        /// Branch to untrack (defaults to current)
        branch: Option<String>,

        /// Also untrack descendants without prompting
        #[arg(long, short)]
        force: bool,
    },

    /// Rebase this branch onto its recorded base
    #[command(name = "restack", visible_alias = "rs")]
    Restack {
        /// Branch to restack (defaults to current)
        branch: Option<String>,
    },

    /// Submit this branch's change request to the forge
    #[command(name = "submit", visible_alias = "s")]
    Submit {
        /// Branch to submit (defaults to current)
        branch: Option<String>,

        /// Create as a draft
        #[arg(long, conflicts_with = "no_draft")]
        draft: bool,

        /// Mark the change request ready for review (undoes a prior --draft)
        #[arg(long)]
        no_draft: bool,

        /// Change request title override
        #[arg(long)]
        title: Option<String>,

        /// Change request body override
        #[arg(long)]
        body: Option<String>,

        /// Individual reviewers to request (comma-separated)
        #[arg(long, value_delimiter = ',')]
        reviewer: Vec<String>,

        /// Team reviewers to request (comma-separated team slugs)
        #[arg(long, value_delimiter = ',')]
        team_reviewer: Vec<String>,

        /// Full replacement label set (comma-separated)
        #[arg(long, value_delimiter = ',')]
        label: Vec<String>,

        /// Full replacement assignee set (comma-separated)
        #[arg(long, value_delimiter = ',')]
        assignee: Vec<String>,

        /// Skip the restacked check and reuse a head-mismatched change request
        #[arg(long, short)]
        force: bool,

        /// Only update an existing change request; never create one
        #[arg(long)]
        update_only: bool,

        /// Skip the pre-submit restack
        #[arg(long)]
        no_restack: bool,

        /// Search the Forge for an existing change request and open one if
        /// needed (the default)
        #[arg(long, conflicts_with = "no_publish")]
        publish: bool,

        /// Push the branch without searching for or creating a change request
        #[arg(long)]
        no_publish: bool,
    },
}

/// `upstack`/`downstack`/`stack` subcommands - each just restacks the named
/// scope, so they share one action enum.
#[derive(Subcommand, Debug)]
pub enum RestackAction {
    /// Restack this scope
    #[command(name = "restack", visible_alias = "rs")]
    Restack {
        /// Branch to root the scope at (defaults to current)
        branch: Option<String>,
    },
}

/// `repo` subcommands.
#[derive(Subcommand, Debug)]
pub enum RepoAction {
    /// Restack every tracked stack rooted on trunk
    #[command(name = "restack", visible_alias = "rs")]
    Restack,
}

/// `commit` subcommands.
#[derive(Subcommand, Debug)]
pub enum CommitAction {
    /// Amend the current branch's tip commit
    #[command(name = "fixup")]
    Fixup {
        /// Stage all changes (git add -A)
        #[arg(short, long)]
        all: bool,

        /// Stage modified tracked files (git add -u)
        #[arg(short, long)]
        update: bool,

        /// Interactive patch staging (git add -p)
        #[arg(short, long)]
        patch: bool,
    },

    /// Create a new commit on the current branch
    #[command(name = "pick")]
    Pick {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Stage all changes (git add -A)
        #[arg(short, long)]
        all: bool,

        /// Stage modified tracked files (git add -u)
        #[arg(short, long)]
        update: bool,

        /// Interactive patch staging (git add -p)
        #[arg(short, long)]
        patch: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}
