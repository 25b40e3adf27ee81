//! Agent catalog loading.
//!
//! # Resolution Order
//!
//! 1. The versioned catalog file (`agents.yaml`) when it exists
//! 2. Otherwise every `*<suffix>` document under the agents directory
//! 3. If neither yields an agent, the built-in `general` agent
//!
//! A document that fails to read or parse is logged and skipped. A missing
//! agents directory is not an error.

use crate::agent::catalog::AgentCatalogFile;
use crate::agent::document::{estimate_token_budget, parse_agent_document};
use crate::agent::skills::infer_skills;
use crate::agent::types::{Agent, AgentDefinition, AgentSource};
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Id of the agent synthesized when discovery finds nothing.
pub const DEFAULT_AGENT_ID: &str = "general";

/// Load the agent catalog for a project. Never returns an empty list.
///
/// # Errors
///
/// Only a present but invalid `agents.yaml` is an error; document problems
/// are logged and skipped.
pub fn load_agents(ctx: &ProjectContext, config: &Config) -> Result<Vec<Agent>> {
    let catalog_path = ctx.agents_file(config);

    let mut agents = match AgentCatalogFile::load(&catalog_path)? {
        Some(catalog) => {
            debug!(
                path = %catalog_path.display(),
                agents = catalog.agent_count(),
                "loaded agent catalog"
            );
            catalog.to_agents(&catalog_path, config)
        }
        None => scan_documents(&ctx.agents_dir(config), config),
    };

    if agents.is_empty() {
        warn!(
            agents_dir = %ctx.agents_dir(config).display(),
            "no agents discovered; using built-in default agent"
        );
        agents.push(default_agent(config));
    }

    Ok(agents)
}

/// Parse every agent document in `dir`, skipping the ones that fail.
pub fn scan_documents(dir: &Path, config: &Config) -> Vec<Agent> {
    let mut agents = Vec::new();

    for path in discover_documents(dir, &config.agent_file_suffix) {
        match load_document(&path, config) {
            Ok(agent) => {
                debug!(
                    id = agent.id(),
                    agent_type = agent.agent_type(),
                    path = %path.display(),
                    "parsed agent document"
                );
                agents.push(agent);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping agent document");
            }
        }
    }

    agents
}

/// List agent documents in `dir`, sorted by filename.
///
/// Returns an empty list if the directory is missing or unreadable.
pub fn discover_documents(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "agents directory not readable");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
        .map(|e| e.path())
        .collect();
    paths.sort();
    paths
}

/// Derive the agent id from a document filename by removing the suffix.
pub fn agent_id_from_path(path: &Path, suffix: &str) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let id = name.strip_suffix(suffix)?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Read and parse a single agent document.
pub fn load_document(path: &Path, config: &Config) -> Result<Agent> {
    let id = agent_id_from_path(path, &config.agent_file_suffix).ok_or_else(|| {
        AllotError::UserError(format!(
            "cannot derive an agent id from '{}'",
            path.display()
        ))
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        AllotError::UserError(format!(
            "failed to read agent document '{}': {}",
            path.display(),
            e
        ))
    })?;

    let definition = parse_agent_document(&id, &content)?;
    let skills = infer_skills(&content, &definition.agent_type);

    Ok(Agent {
        definition,
        skills,
        token_budget: estimate_token_budget(&content),
        current_tasks: Vec::new(),
        max_parallel_tasks: config.max_parallel_tasks,
        source: AgentSource::Document(path.to_path_buf()),
    })
}

/// The catch-all agent used when discovery yields nothing.
pub fn default_agent(config: &Config) -> Agent {
    let definition = AgentDefinition {
        id: DEFAULT_AGENT_ID.to_string(),
        name: "General Purpose Agent".to_string(),
        agent_type: "general".to_string(),
        version: Some("1.0".to_string()),
        last_updated: None,
        responsibilities: vec![
            "Handle tasks no specialized agent covers".to_string(),
            "Implement features across the codebase".to_string(),
            "Fix bugs and write tests".to_string(),
            "Update documentation".to_string(),
        ],
        ..Default::default()
    };

    let text = definition.responsibilities.join("\n");
    Agent {
        skills: infer_skills(&text, &definition.agent_type),
        token_budget: estimate_token_budget(&text),
        definition,
        current_tasks: Vec::new(),
        max_parallel_tasks: config.max_parallel_tasks,
        source: AgentSource::Synthesized,
    }
}
