//! Implementation of the `allot agents` commands.
//!
//! - `agents list` - one block per agent in catalog order
//! - `agents show` - the full definition of one agent

use crate::agent::Agent;
use crate::cli::AgentShowArgs;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::registry::AgentRegistry;

/// Execute the `allot agents list` command.
pub fn cmd_agents_list() -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;
    let registry = AgentRegistry::load(&ctx, &config)?;

    println!("Agents ({}):", registry.len());
    println!();

    for agent in registry.agents() {
        println!("  {}", agent.id());
        println!("    Name:        {}", agent.name());
        println!("    Type:        {}", agent.agent_type());
        println!("    Max tasks:   {}", agent.max_parallel_tasks);
        if let Some(summary) = agent.summary() {
            println!("    Summary:     {}", truncate(summary, 60));
        }
        println!("    Source:      {}", agent.source);
        println!();
    }

    Ok(())
}

/// Execute the `allot agents show` command.
pub fn cmd_agents_show(args: AgentShowArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;
    let registry = AgentRegistry::load(&ctx, &config)?;
    let agent = registry.get_agent(&args.id)?;

    print!("{}", render_agent(agent));
    Ok(())
}

fn render_agent(agent: &Agent) -> String {
    let def = &agent.definition;
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", def.name, def.id));
    out.push_str(&format!("Type:          {}\n", def.agent_type));
    if let Some(version) = &def.version {
        out.push_str(&format!("Version:       {}\n", version));
    }
    if let Some(updated) = &def.last_updated {
        out.push_str(&format!("Last updated:  {}\n", updated));
    }
    out.push_str(&format!("Source:        {}\n", agent.source));
    out.push_str(&format!("Token budget:  {}\n", agent.token_budget));
    out.push_str(&format!("Max tasks:     {}\n", agent.max_parallel_tasks));

    push_list(&mut out, "Responsibilities", &def.responsibilities);
    push_list(&mut out, "Patterns", &def.patterns);
    push_list(&mut out, "Code paths", &def.relevant_code_paths);
    push_list(&mut out, "Pitfalls", &def.common_pitfalls);

    if !def.performance_targets.is_empty() {
        out.push_str("\nPerformance targets:\n");
        for (metric, target) in &def.performance_targets {
            out.push_str(&format!("  - {}: {}\n", metric, target));
        }
    }

    let skills: Vec<&str> = agent.skills.iter().map(String::as_str).collect();
    out.push_str(&format!("\nSkills: {}\n", skills.join(", ")));
    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", heading));
    for item in items {
        out.push_str(&format!("  - {}\n", item));
    }
}

/// Truncate to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AllotError;
    use crate::test_support::{DirGuard, make_agent, write_agent_doc};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_render_agent_lists_sections() {
        let mut agent = make_agent("infra", "Infrastructure", &["Pattern-TDD-001"], &["src/docker"]);
        agent
            .definition
            .performance_targets
            .insert("Build time".to_string(), "< 5 min".to_string());

        let out = render_agent(&agent);
        assert!(out.starts_with("infra agent (infra)\n"));
        assert!(out.contains("Type:          Infrastructure\n"));
        assert!(out.contains("Patterns:\n  - Pattern-TDD-001\n"));
        assert!(out.contains("Code paths:\n  - src/docker\n"));
        assert!(out.contains("  - Build time: < 5 min\n"));
        assert!(out.contains("Skills: execute:infrastructure"));
        assert!(!out.contains("Pitfalls:"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    #[serial]
    fn test_show_unknown_agent_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        let ctx = ProjectContext::resolve_from(temp_dir.path());
        write_agent_doc(&ctx, &Config::default(), "api", "# API Agent\n**Type:** API\n");

        let err = cmd_agents_show(AgentShowArgs {
            id: "ghost".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, AllotError::AgentNotFound { .. }));
        assert!(err.to_string().contains("Available agents: api"));
    }

    #[test]
    #[serial]
    fn test_list_with_no_documents_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        cmd_agents_list().unwrap();
    }
}
