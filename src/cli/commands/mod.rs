//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler opens the repository, does its work through `core`/`engine`,
//! and prints to stdout; none of them perform repository mutations without
//! going through [`crate::core::repository::Repository`] or
//! [`crate::engine::restack`]/[`crate::engine::submit`].

mod checkout;
mod commit_cmd;
mod common;
mod config_cmd;
mod info;
mod init;
mod log_cmd;
mod navigation;
mod recovery;
mod restack;
mod submit;
mod track;
mod trunk;
mod untrack;

use crate::cli::args::{BranchAction, Command, CommitAction, ConfigAction, RepoAction, RestackAction};
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { trunk, force } => init::run(ctx, trunk.as_deref(), force),

        Command::Branch { action } => match action {
            BranchAction::Track {
                branch,
                parent,
                force,
            } => track::track(ctx, branch.as_deref(), parent.as_deref(), force, false),
            BranchAction::Untrack { branch, force } => {
                untrack::untrack(ctx, branch.as_deref(), force)
            }
            BranchAction::Restack { branch } => restack::branch(ctx, branch.as_deref()),
            BranchAction::Submit {
                branch,
                draft,
                no_draft,
                title,
                body,
                reviewer,
                team_reviewer,
                label,
                assignee,
                force,
                update_only,
                no_restack,
                publish: _,
                no_publish,
            } => submit::submit(
                ctx,
                branch.as_deref(),
                draft,
                no_draft,
                title.as_deref(),
                body.as_deref(),
                &reviewer,
                &team_reviewer,
                &label,
                &assignee,
                force,
                update_only,
                no_restack,
                no_publish,
            ),
        },

        Command::Upstack { action } => match action {
            RestackAction::Restack { branch } => restack::upstack(ctx, branch.as_deref()),
        },
        Command::Downstack { action } => match action {
            RestackAction::Restack { branch } => restack::downstack(ctx, branch.as_deref()),
        },
        Command::Stack { action } => match action {
            RestackAction::Restack { branch } => restack::stack(ctx, branch.as_deref()),
        },
        Command::Repo { action } => match action {
            RepoAction::Restack => restack::repo(ctx),
        },

        Command::Continue { all } => recovery::continue_op(ctx, all),
        Command::Abort => recovery::abort(ctx),

        Command::Log {
            short,
            long,
            stack,
            all,
            reverse,
        } => log_cmd::log(ctx, short, long, stack, all, reverse),
        Command::Info {
            branch,
            diff,
            stat,
            patch,
        } => info::info(ctx, branch.as_deref(), diff, stat, patch),
        Command::Trunk { set } => trunk::run(ctx, set.as_deref()),

        Command::Checkout { branch, trunk } => checkout::run(ctx, branch.as_deref(), trunk),
        Command::Up { steps } => navigation::up(ctx, steps),
        Command::Down { steps } => navigation::down(ctx, steps),
        Command::Top => navigation::top(ctx),
        Command::Bottom => navigation::bottom(ctx),

        Command::Commit { action } => match action {
            CommitAction::Fixup {
                all,
                update,
                patch,
            } => commit_cmd::fixup(ctx, all, update, patch),
            CommitAction::Pick {
                message,
                all,
                update,
                patch,
            } => commit_cmd::pick(ctx, &message, all, update, patch),
        },

        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
    }
}
