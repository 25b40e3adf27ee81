//! Configuration model for allot.
//!
//! This module defines the Config struct that represents `.allot/config.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.
//!
//! # File Format
//!
//! ```yaml
//! agents_dir: internal/agents
//! agent_file_suffix: -agent-context.md
//! agents_file: .allot/agents.yaml
//! max_parallel_tasks: 3
//! gateway_timeout_seconds: 300
//! audit_events: true
//! escalation:
//!   min_score: 0.60
//!   max_score: 0.80
//!   similarity_window: 0.15
//!   max_options: 3
//! ```

use crate::error::{AllotError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds controlling when an assignment is escalated to a human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Lowest best score that is still worth asking about.
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Highest best score that is still considered ambiguous.
    #[serde(default = "default_max_score")]
    pub max_score: f64,

    /// Candidates within this distance of the best score count as similar.
    #[serde(default = "default_similarity_window")]
    pub similarity_window: f64,

    /// Maximum number of candidates offered to the human.
    #[serde(default = "default_max_options")]
    pub max_options: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_score: default_max_score(),
            similarity_window: default_similarity_window(),
            max_options: default_max_options(),
        }
    }
}

/// Configuration for the assignment engine.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Catalog discovery
    // =========================================================================
    /// Directory scanned for agent context documents, relative to the project root.
    #[serde(default = "default_agents_dir")]
    pub agents_dir: String,

    /// Filename suffix identifying an agent document. The id is the filename
    /// with this suffix removed.
    #[serde(default = "default_agent_file_suffix")]
    pub agent_file_suffix: String,

    /// Versioned agent catalog, relative to the project root. When present it
    /// takes precedence over the document scan.
    #[serde(default = "default_agents_file")]
    pub agents_file: String,

    // =========================================================================
    // Workload
    // =========================================================================
    /// Default concurrency limit per agent (advisory).
    #[serde(default = "default_max_parallel_tasks")]
    pub max_parallel_tasks: u32,

    // =========================================================================
    // Escalation
    // =========================================================================
    /// Seconds to wait for a human decision before treating it as a skip.
    #[serde(default = "default_gateway_timeout_seconds")]
    pub gateway_timeout_seconds: u64,

    /// Escalation thresholds.
    #[serde(default)]
    pub escalation: EscalationConfig,

    // =========================================================================
    // Audit
    // =========================================================================
    /// Whether to append assignment events to `.allot/events/assignments.ndjson`.
    #[serde(default = "default_true")]
    pub audit_events: bool,
}

// Default value functions for serde
fn default_agents_dir() -> String {
    "internal/agents".to_string()
}
fn default_agent_file_suffix() -> String {
    "-agent-context.md".to_string()
}
fn default_agents_file() -> String {
    ".allot/agents.yaml".to_string()
}
fn default_max_parallel_tasks() -> u32 {
    3
}
fn default_gateway_timeout_seconds() -> u64 {
    300
}
fn default_min_score() -> f64 {
    0.60
}
fn default_max_score() -> f64 {
    0.80
}
fn default_similarity_window() -> f64 {
    0.15
}
fn default_max_options() -> usize {
    3
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
            agent_file_suffix: default_agent_file_suffix(),
            agents_file: default_agents_file(),
            max_parallel_tasks: default_max_parallel_tasks(),
            gateway_timeout_seconds: default_gateway_timeout_seconds(),
            escalation: EscalationConfig::default(),
            audit_events: default_true(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Returns `Config::default()` if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AllotError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a defaulted struct.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| AllotError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AllotError::ConfigError(format!("failed to serialize config: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `agent_file_suffix` must be non-empty
    /// - `max_parallel_tasks` and `gateway_timeout_seconds` must be positive
    /// - escalation scores must satisfy `0 <= min_score <= max_score <= 1`
    /// - `similarity_window` must be non-negative, `max_options` at least 1
    pub fn validate(&self) -> Result<()> {
        if self.agent_file_suffix.is_empty() {
            return Err(AllotError::ConfigError(
                "agent_file_suffix must not be empty".to_string(),
            ));
        }

        if self.max_parallel_tasks == 0 {
            return Err(AllotError::ConfigError(
                "max_parallel_tasks must be greater than 0".to_string(),
            ));
        }

        if self.gateway_timeout_seconds == 0 {
            return Err(AllotError::ConfigError(
                "gateway_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let esc = &self.escalation;
        if !(0.0..=1.0).contains(&esc.min_score)
            || !(0.0..=1.0).contains(&esc.max_score)
            || esc.min_score > esc.max_score
        {
            return Err(AllotError::ConfigError(format!(
                "escalation scores must satisfy 0 <= min_score <= max_score <= 1 (got {} and {})",
                esc.min_score, esc.max_score
            )));
        }

        if esc.similarity_window < 0.0 || esc.similarity_window.is_nan() {
            return Err(AllotError::ConfigError(
                "escalation.similarity_window must not be negative".to_string(),
            ));
        }

        if esc.max_options == 0 {
            return Err(AllotError::ConfigError(
                "escalation.max_options must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agents_dir, "internal/agents");
        assert_eq!(config.agent_file_suffix, "-agent-context.md");
        assert_eq!(config.max_parallel_tasks, 3);
        assert_eq!(config.gateway_timeout_seconds, 300);
        assert_eq!(config.escalation.min_score, 0.60);
        assert_eq!(config.escalation.max_score, 0.80);
        assert_eq!(config.escalation.similarity_window, 0.15);
        assert_eq!(config.escalation.max_options, 3);
        assert!(config.audit_events);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.max_parallel_tasks, 3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
agents_dir: docs/agents
escalation:
  max_options: 2
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.agents_dir, "docs/agents");
        assert_eq!(config.escalation.max_options, 2);
        assert_eq!(config.escalation.min_score, 0.60);
        assert_eq!(config.gateway_timeout_seconds, 300);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let yaml = r#"
max_parallel_tasks: 5
future_setting: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.max_parallel_tasks, 5);
    }

    #[test]
    fn test_zero_timeout_fails() {
        let result = Config::from_yaml("gateway_timeout_seconds: 0");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("gateway_timeout_seconds must be greater than 0")
        );
    }

    #[test]
    fn test_inverted_band_fails() {
        let yaml = r#"
escalation:
  min_score: 0.9
  max_score: 0.5
"#;
        let result = Config::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_score"));
    }

    #[test]
    fn test_zero_max_options_fails() {
        let yaml = r#"
escalation:
  max_options: 0
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = Config::from_yaml("max_parallel_tasks: [").unwrap_err();
        assert!(matches!(err, AllotError::ConfigError(_)));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.agents_dir, "internal/agents");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config {
            max_parallel_tasks: 7,
            ..Default::default()
        };
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.max_parallel_tasks, 7);
        assert_eq!(parsed.escalation, config.escalation);
    }
}
