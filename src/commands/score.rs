//! Implementation of the `allot score` command.
//!
//! Prints every agent's score for a task, best first, with the per-signal
//! breakdown. Nothing is assigned or recorded.

use crate::assign::{rank_agents, score_breakdown};
use crate::cli::ScoreArgs;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::registry::AgentRegistry;
use crate::task::TaskContext;

/// Execute the `allot score` command.
pub fn cmd_score(args: ScoreArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;
    let task = TaskContext::load(&args.task_file)?;
    let registry = AgentRegistry::load(&ctx, &config)?;

    print!("{}", render_scores(&registry, &task));
    Ok(())
}

fn render_scores(registry: &AgentRegistry, task: &TaskContext) -> String {
    let mut out = format!(
        "Task {} ({}), category '{}', {} pattern(s), {} file(s)\n\n",
        task.id,
        task.name,
        task.category,
        task.patterns.len(),
        task.files.len()
    );

    let width = registry
        .agents()
        .iter()
        .map(|a| a.id().len())
        .max()
        .unwrap_or(0)
        .max("AGENT".len());

    out.push_str(&format!(
        "  {:<width$}  {:>5}  {:>8}  {:>8}  {:>5}\n",
        "AGENT", "SCORE", "CATEGORY", "PATTERNS", "PATHS"
    ));
    for candidate in rank_agents(registry.agents(), task) {
        let breakdown = score_breakdown(candidate.agent, task);
        out.push_str(&format!(
            "  {:<width$}  {:>5.2}  {:>8.2}  {:>8.2}  {:>5.2}\n",
            candidate.agent.id(),
            candidate.score,
            breakdown.category,
            breakdown.patterns,
            breakdown.paths
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_agent;

    #[test]
    fn test_render_scores_ranks_best_first() {
        let registry = AgentRegistry::from_agents(vec![
            make_agent("ui", "UI", &[], &[]),
            make_agent("infrastructure", "Infrastructure", &["Pattern-TDD-001"], &["src/docker"]),
        ])
        .unwrap();
        let task = TaskContext::new("T-1", "Infrastructure")
            .with_patterns(["Pattern-TDD-001"])
            .with_files(["src/docker/build.ts"]);

        let out = render_scores(&registry, &task);
        let rows: Vec<&str> = out.lines().skip(3).collect();

        assert!(out.starts_with("Task T-1"));
        assert!(out.contains("category 'Infrastructure'"));
        let first: Vec<&str> = rows[0].split_whitespace().collect();
        assert_eq!(first, vec!["infrastructure", "1.00", "1.00", "1.00", "1.00"]);
        let second: Vec<&str> = rows[1].split_whitespace().collect();
        assert_eq!(second, vec!["ui", "0.00", "0.00", "0.00", "0.00"]);
    }
}
