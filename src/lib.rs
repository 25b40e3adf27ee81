//! Allot: assign development tasks to specialized agents.
//!
//! Agents are discovered from markdown context documents (or a versioned
//! `agents.yaml` catalog), tasks are scored against every agent, and close
//! calls are escalated to a human through a [`assign::DecisionGateway`].
//!
//! ```no_run
//! use allot::assign::{Arbiter, NoGateway};
//! use allot::context::ProjectContext;
//! use allot::registry::AgentRegistry;
//! use allot::task::TaskContext;
//!
//! let ctx = ProjectContext::resolve()?;
//! let config = ctx.load_config()?;
//! let mut registry = AgentRegistry::load(&ctx, &config)?;
//! let arbiter = Arbiter::from_config(&ctx, &config, NoGateway);
//!
//! let task = TaskContext::new("TASK-001", "Infrastructure")
//!     .with_patterns(["Pattern-TDD-001"])
//!     .with_files(["src/docker/build.ts"]);
//! let decision = arbiter.assign_and_record(&mut registry, &task)?;
//! println!("{}", decision.audit_line());
//! # Ok::<(), allot::error::AllotError>(())
//! ```

pub mod agent;
pub mod assign;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod registry;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;
