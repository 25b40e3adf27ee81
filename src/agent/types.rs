//! Agent records held by the catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Static capability data, parsed once per load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Stable identifier, unique within a catalog.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-text category token matched against a task's category.
    #[serde(rename = "type")]
    pub agent_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub responsibilities: Vec<String>,

    /// Pattern identifiers such as `Pattern-TDD-001`, deduplicated.
    #[serde(default)]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub performance_targets: BTreeMap<String, String>,

    #[serde(default)]
    pub common_pitfalls: Vec<String>,

    /// Path fragments (or globs) used for file affinity, deduplicated.
    #[serde(default)]
    pub relevant_code_paths: Vec<String>,
}

/// Where an agent's definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSource {
    /// A markdown context document.
    Document(PathBuf),
    /// An entry in the versioned catalog file.
    Catalog(PathBuf),
    /// The built-in catch-all agent injected when nothing was discovered.
    Synthesized,
}

impl fmt::Display for AgentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentSource::Document(path) => write!(f, "document {}", path.display()),
            AgentSource::Catalog(path) => write!(f, "catalog {}", path.display()),
            AgentSource::Synthesized => write!(f, "built-in default"),
        }
    }
}

/// A catalog entry: the definition plus runtime state.
///
/// `current_tasks` is only mutated through the registry's workload tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub definition: AgentDefinition,

    /// Coarse capability tokens, see [`crate::agent::infer_skills`].
    pub skills: BTreeSet<String>,

    /// Capacity heuristic derived from the size of the agent's context.
    pub token_budget: usize,

    /// Ids of tasks currently assigned to this agent.
    pub current_tasks: Vec<String>,

    /// Advisory concurrency limit.
    pub max_parallel_tasks: u32,

    pub source: AgentSource,
}

impl Agent {
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn agent_type(&self) -> &str {
        &self.definition.agent_type
    }

    /// First responsibility line, if any.
    pub fn summary(&self) -> Option<&str> {
        self.definition.responsibilities.first().map(String::as_str)
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// Current workload snapshot.
    pub fn workload(&self) -> Workload {
        let current = self.current_tasks.len();
        Workload {
            current,
            max: self.max_parallel_tasks,
            available: i64::from(self.max_parallel_tasks) - current as i64,
        }
    }
}

/// Per-agent task counts against the concurrency limit.
///
/// `available` is not clamped: an over-assigned agent reports a negative value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub current: usize,
    pub max: u32,
    pub available: i64,
}

impl Workload {
    pub fn is_over_capacity(&self) -> bool {
        self.available < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_agent(tasks: &[&str], max: u32) -> Agent {
        Agent {
            definition: AgentDefinition {
                id: "infra".to_string(),
                name: "Infrastructure Agent".to_string(),
                agent_type: "Infrastructure".to_string(),
                responsibilities: vec!["Own CI pipelines".to_string()],
                ..Default::default()
            },
            skills: BTreeSet::new(),
            token_budget: 0,
            current_tasks: tasks.iter().map(|t| t.to_string()).collect(),
            max_parallel_tasks: max,
            source: AgentSource::Synthesized,
        }
    }

    #[test]
    fn workload_reports_available_capacity() {
        let agent = make_agent(&["T-1"], 3);
        let workload = agent.workload();
        assert_eq!(workload.current, 1);
        assert_eq!(workload.max, 3);
        assert_eq!(workload.available, 2);
        assert!(!workload.is_over_capacity());
    }

    #[test]
    fn workload_goes_negative_when_over_assigned() {
        let agent = make_agent(&["T-1", "T-2", "T-3"], 2);
        let workload = agent.workload();
        assert_eq!(workload.available, -1);
        assert!(workload.is_over_capacity());
    }

    #[test]
    fn summary_is_first_responsibility() {
        let agent = make_agent(&[], 1);
        assert_eq!(agent.summary(), Some("Own CI pipelines"));
    }

    #[test]
    fn definition_serializes_type_field() {
        let agent = make_agent(&[], 1);
        let yaml = serde_yaml::to_string(&agent.definition).unwrap();
        assert!(yaml.contains("type: Infrastructure"));
    }

    #[test]
    fn source_display() {
        assert_eq!(AgentSource::Synthesized.to_string(), "built-in default");
        let source = AgentSource::Document(PathBuf::from("agents/infra-agent-context.md"));
        assert!(source.to_string().starts_with("document "));
    }
}
