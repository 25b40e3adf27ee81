//! Command implementations for allot.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod agents;
mod assign;
mod import;
mod init;
mod score;

use crate::cli::{AgentsAction, AgentsCommand, Command};
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Agents(cmd) => dispatch_agents(cmd),
        Command::Import(args) => import::cmd_import(args),
        Command::Score(args) => score::cmd_score(args),
        Command::Assign(args) => assign::cmd_assign(args),
    }
}

fn dispatch_agents(cmd: AgentsCommand) -> Result<()> {
    match cmd.action {
        AgentsAction::List => agents::cmd_agents_list(),
        AgentsAction::Show(args) => agents::cmd_agents_show(args),
    }
}
