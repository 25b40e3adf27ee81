//! Versioned agent catalog (`agents.yaml`).
//!
//! This is the primary source of truth for agent capability records. The
//! markdown document scan is kept for projects that have not migrated;
//! `allot import` converts documents into this format.
//!
//! # File Format
//!
//! ```yaml
//! version: 1
//! agents:
//!   infrastructure:
//!     name: "Infrastructure Agent"
//!     type: Infrastructure
//!     version: "1.2"
//!     last_updated: "2025-10-01"
//!     responsibilities:
//!       - Own CI pipelines
//!     patterns: [Pattern-TDD-001]
//!     performance_targets:
//!       Build time: "< 5 min"
//!     common_pitfalls: []
//!     relevant_code_paths: [src/docker, "infra/**/*.tf"]
//!     skills: [containers]        # optional; inferred when omitted
//!     max_parallel_tasks: 2       # optional; config default otherwise
//!     token_budget: 4000          # optional; estimated otherwise
//! ```

use crate::agent::document::estimate_token_budget;
use crate::agent::skills::{baseline_skill, infer_skills};
use crate::agent::types::{Agent, AgentDefinition, AgentSource};
use crate::config::Config;
use crate::error::{AllotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Catalog schema version this build reads and writes.
pub const CATALOG_VERSION: u32 = 1;

/// The `agents.yaml` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCatalogFile {
    pub version: u32,

    /// Entries keyed by agent id.
    #[serde(default)]
    pub agents: BTreeMap<String, CatalogEntry>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One agent in the catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub agent_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub performance_targets: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_pitfalls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relevant_code_paths: Vec<String>,

    /// Explicit skills. When empty, skills are inferred from the entry text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_tasks: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<usize>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl CatalogEntry {
    /// Text the skill inferencer and token estimate look at.
    fn context_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.name);
        text.push('\n');
        text.push_str(&self.agent_type);
        for line in self.responsibilities.iter().chain(&self.common_pitfalls) {
            text.push('\n');
            text.push_str(line);
        }
        for (key, value) in &self.performance_targets {
            text.push_str(&format!("\n{}: {}", key, value));
        }
        text
    }

    fn to_definition(&self, id: &str) -> AgentDefinition {
        AgentDefinition {
            id: id.to_string(),
            name: if self.name.is_empty() {
                id.to_string()
            } else {
                self.name.clone()
            },
            agent_type: self.agent_type.clone(),
            version: self.version.clone(),
            last_updated: self.last_updated.clone(),
            responsibilities: self.responsibilities.clone(),
            patterns: self.patterns.clone(),
            performance_targets: self.performance_targets.clone(),
            common_pitfalls: self.common_pitfalls.clone(),
            relevant_code_paths: self.relevant_code_paths.clone(),
        }
    }
}

impl AgentCatalogFile {
    /// An empty catalog at the current version.
    pub fn new() -> Self {
        Self {
            version: CATALOG_VERSION,
            agents: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Load the catalog from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    /// Returns `Err` if the file exists but cannot be parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AllotError::UserError(format!(
                "failed to read agent catalog '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
            .map(Some)
            .map_err(|e| match e {
                AllotError::ConfigError(msg) => {
                    AllotError::ConfigError(format!("{} ({})", msg, path.display()))
                }
                other => other,
            })
    }

    /// Parse the catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: AgentCatalogFile = serde_yaml::from_str(yaml).map_err(|e| {
            AllotError::ConfigError(format!("failed to parse agent catalog: {}", e))
        })?;

        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize the catalog to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            AllotError::ConfigError(format!("failed to serialize agent catalog: {}", e))
        })
    }

    /// Validate the catalog.
    ///
    /// Validation rules:
    /// - `version` must be supported
    /// - agent ids and types must not be empty
    /// - `max_parallel_tasks` must be positive when set
    pub fn validate(&self) -> Result<()> {
        if self.version != CATALOG_VERSION {
            return Err(AllotError::ConfigError(format!(
                "agent catalog version {} is not supported (expected {})",
                self.version, CATALOG_VERSION
            )));
        }

        for (id, entry) in &self.agents {
            if id.trim().is_empty() {
                return Err(AllotError::ConfigError(
                    "agent catalog contains an empty agent id".to_string(),
                ));
            }

            if entry.agent_type.trim().is_empty() {
                return Err(AllotError::ConfigError(format!(
                    "agent '{}' has an empty type",
                    id
                )));
            }

            if entry.max_parallel_tasks == Some(0) {
                return Err(AllotError::ConfigError(format!(
                    "agent '{}' has max_parallel_tasks of 0",
                    id
                )));
            }
        }

        Ok(())
    }

    /// Build runtime agents from the catalog entries, in id order.
    pub fn to_agents(&self, path: &Path, config: &Config) -> Vec<Agent> {
        self.agents
            .iter()
            .map(|(id, entry)| {
                let text = entry.context_text();
                let skills: BTreeSet<String> = if entry.skills.is_empty() {
                    infer_skills(&text, &entry.agent_type)
                } else {
                    let mut skills: BTreeSet<String> = entry.skills.iter().cloned().collect();
                    skills.insert(baseline_skill(&entry.agent_type));
                    skills
                };

                Agent {
                    definition: entry.to_definition(id),
                    skills,
                    token_budget: entry
                        .token_budget
                        .unwrap_or_else(|| estimate_token_budget(&text)),
                    current_tasks: Vec::new(),
                    max_parallel_tasks: entry
                        .max_parallel_tasks
                        .unwrap_or(config.max_parallel_tasks),
                    source: AgentSource::Catalog(path.to_path_buf()),
                }
            })
            .collect()
    }

    /// Build a catalog from already-loaded agents (used by the document import).
    pub fn from_agents<'a, I>(agents: I) -> Self
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut catalog = Self::new();
        for agent in agents {
            let def = &agent.definition;
            catalog.agents.insert(
                def.id.clone(),
                CatalogEntry {
                    name: def.name.clone(),
                    agent_type: def.agent_type.clone(),
                    version: def.version.clone(),
                    last_updated: def.last_updated.clone(),
                    responsibilities: def.responsibilities.clone(),
                    patterns: def.patterns.clone(),
                    performance_targets: def.performance_targets.clone(),
                    common_pitfalls: def.common_pitfalls.clone(),
                    relevant_code_paths: def.relevant_code_paths.clone(),
                    skills: agent.skills.iter().cloned().collect(),
                    max_parallel_tasks: None,
                    token_budget: Some(agent.token_budget),
                    extra: BTreeMap::new(),
                },
            );
        }
        catalog
    }

    /// Number of agents in the catalog.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

impl Default for AgentCatalogFile {
    fn default() -> Self {
        Self::new()
    }
}
