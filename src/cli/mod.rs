//! CLI argument parsing for allot.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Allot: assign development tasks to specialized agents.
///
/// Agents are described by markdown context documents (or a versioned
/// agents.yaml catalog). Each task is scored against every agent; close
/// calls are put to you for a decision.
#[derive(Parser, Debug)]
#[command(name = "allot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for allot.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize allot in the current directory.
    ///
    /// Creates `.allot/config.yaml` with default settings. Existing
    /// configuration is left untouched.
    Init,

    /// Inspect the agent catalog.
    Agents(AgentsCommand),

    /// Import agent context documents into `.allot/agents.yaml`.
    ///
    /// Parses every document in the agents directory and writes the
    /// equivalent versioned catalog.
    Import(ImportArgs),

    /// Show how every agent scores against a task, without assigning.
    Score(ScoreArgs),

    /// Assign one or more tasks to agents.
    ///
    /// Tasks are assigned in order; each assignment counts against the
    /// chosen agent's workload for the tasks that follow.
    Assign(AssignArgs),
}

/// Agent catalog subcommands.
#[derive(Parser, Debug)]
pub struct AgentsCommand {
    #[command(subcommand)]
    pub action: AgentsAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentsAction {
    /// List all agents with their type and workload limit.
    List,

    /// Show everything known about one agent.
    Show(AgentShowArgs),
}

#[derive(Parser, Debug)]
pub struct AgentShowArgs {
    /// Agent id (e.g., infrastructure).
    pub id: String,
}

/// Arguments for the `import` command.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Overwrite an existing agents.yaml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `score` command.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Task file (YAML frontmatter + markdown, or plain YAML).
    pub task_file: PathBuf,
}

/// Arguments for the `assign` command.
#[derive(Parser, Debug)]
pub struct AssignArgs {
    /// Task files to assign, in order.
    #[arg(required = true)]
    pub task_files: Vec<PathBuf>,

    /// Never prompt; close calls are resolved automatically.
    #[arg(long)]
    pub no_prompt: bool,

    /// Print decisions as JSON lines instead of text.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
