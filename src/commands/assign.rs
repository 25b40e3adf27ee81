//! Implementation of the `allot assign` command.
//!
//! Loads every task file up front (so a bad file fails before anything is
//! assigned), then assigns them in order against one registry so earlier
//! assignments count toward later workloads.
//!
//! Close calls are prompted on stdin/stderr when stdin is a terminal and
//! `--no-prompt` is not given; otherwise they resolve automatically.
//!
//! A task that cannot be assigned is reported and skipped; the rest of the
//! batch still runs and the command fails at the end.

use crate::assign::{Arbiter, AssignmentDecision, NoGateway, TerminalGateway};
use crate::cli::AssignArgs;
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use crate::registry::AgentRegistry;
use crate::task::TaskContext;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

/// Execute the `allot assign` command.
pub fn cmd_assign(args: AssignArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;
    let tasks = load_tasks(&args.task_files)?;
    let mut registry = AgentRegistry::load(&ctx, &config)?;

    let interactive = !args.no_prompt && io::stdin().is_terminal();
    let arbiter = if interactive {
        let gateway = TerminalGateway::new(BufReader::new(io::stdin()), io::stderr())
            .with_timeout(Duration::from_secs(config.gateway_timeout_seconds));
        Arbiter::for_project(&ctx, &config, gateway)
    } else {
        Arbiter::from_config(&ctx, &config, NoGateway)
    };

    let results = assign_tasks(&arbiter, &mut registry, &tasks);

    let mut failed = Vec::new();
    for (task, result) in tasks.iter().zip(results) {
        match result {
            Ok(decision) if args.json => {
                let line = serde_json::to_string(&decision).map_err(|e| {
                    AllotError::UserError(format!("failed to serialize decision: {}", e))
                })?;
                println!("{}", line);
            }
            Ok(decision) => println!("{}", decision.audit_line()),
            Err(e) => {
                eprintln!("Error: task {}: {}", task.id, e);
                failed.push(task.id.as_str());
            }
        }
    }

    if !args.json {
        println!();
        print!("{}", render_workloads(&registry));
    }
    batch_outcome(tasks.len(), &failed)
}

fn load_tasks(paths: &[PathBuf]) -> Result<Vec<TaskContext>> {
    let tasks: Vec<TaskContext> = paths
        .iter()
        .map(TaskContext::load)
        .collect::<Result<_>>()?;

    let mut seen = std::collections::HashSet::new();
    for task in &tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(AllotError::UserError(format!(
                "task id '{}' appears more than once in the input",
                task.id
            )));
        }
    }
    Ok(tasks)
}

/// Assign each task in order, recording workloads as it goes. One result per
/// task; a failed task does not stop the ones after it.
pub(crate) fn assign_tasks(
    arbiter: &Arbiter,
    registry: &mut AgentRegistry,
    tasks: &[TaskContext],
) -> Vec<Result<AssignmentDecision>> {
    tasks
        .iter()
        .map(|task| arbiter.assign_and_record(registry, task))
        .collect()
}

fn batch_outcome(total: usize, failed: &[&str]) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    Err(AllotError::UserError(format!(
        "{} of {} task(s) could not be assigned: {}",
        failed.len(),
        total,
        failed.join(", ")
    )))
}

fn render_workloads(registry: &AgentRegistry) -> String {
    let mut out = String::from("Workload:\n");
    for (id, workload) in registry.workloads() {
        let marker = if workload.is_over_capacity() {
            "  (over capacity)"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {}: {}/{} ({} available){}\n",
            id, workload.current, workload.max, workload.available, marker
        ));
    }
    out
}
