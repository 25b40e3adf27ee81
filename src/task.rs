//! Task input model for allot.
//!
//! Tasks are owned by an external tracker; this module only reads the fields
//! the assignment engine needs. A task file is either plain YAML or YAML
//! frontmatter delimited by `---` lines followed by a markdown body:
//!
//! ```text
//! ---
//! id: TASK-001
//! name: Containerize build
//! category: Infrastructure
//! patterns: [Pattern-TDD-001]
//! files: [src/docker/build.ts]
//! ---
//!
//! Build the release image in CI.
//! ```
//!
//! When the frontmatter has no `description`, the trimmed body is used.

use crate::error::{AllotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A unit of work to be assigned to an agent. Read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Task identifier (e.g., "TASK-001").
    pub id: String,

    /// Short task name.
    #[serde(default)]
    pub name: String,

    /// Category token compared against an agent's type.
    #[serde(default)]
    pub category: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Pattern identifiers the task should follow.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    /// File paths the task is expected to touch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Tracker fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskContext {
    /// Create a task with the given id and category.
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Set the pattern hints.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the file hints.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a task from file content.
    ///
    /// Content starting with `---` is treated as frontmatter plus body;
    /// anything else is parsed as a plain YAML document.
    pub fn parse(content: &str) -> Result<Self> {
        let normalized = content.replace("\r\n", "\n");

        let mut task = if normalized.starts_with("---") {
            let (frontmatter, body) = extract_frontmatter(&normalized)?;
            let mut task = Self::from_yaml(frontmatter)?;
            if task.description.is_empty() {
                task.description = body.trim().to_string();
            }
            task
        } else {
            Self::from_yaml(&normalized)?
        };

        if task.name.is_empty() {
            task.name = task.id.clone();
        }

        task.validate()?;
        Ok(task)
    }

    fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AllotError::UserError(format!("failed to parse task: {}", e)))
    }

    /// Validate required fields.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AllotError::UserError(
                "task is missing a non-empty 'id' field".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a task file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AllotError::UserError(format!(
                "failed to read task file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            AllotError::UserError(msg) => {
                AllotError::UserError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }
}

/// Split normalized content into the frontmatter YAML and the body.
fn extract_frontmatter(normalized: &str) -> Result<(&str, &str)> {
    let first_newline = normalized
        .find('\n')
        .ok_or_else(|| AllotError::UserError("task frontmatter is incomplete".to_string()))?;

    let rest = &normalized[first_newline + 1..];

    // Closing delimiter may be the very first line of `rest` (empty frontmatter).
    let (yaml, after) = if let Some(stripped) = rest.strip_prefix("---") {
        ("", stripped)
    } else {
        let closing_pos = rest.find("\n---").ok_or_else(|| {
            AllotError::UserError("task file missing closing '---' frontmatter delimiter".to_string())
        })?;
        (&rest[..closing_pos], &rest[closing_pos + 4..])
    };

    let body = after.strip_prefix('\n').unwrap_or(after);
    Ok((yaml, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_frontmatter_task() {
        let content = r#"---
id: TASK-001
name: Containerize build
category: Infrastructure
patterns:
  - Pattern-TDD-001
files:
  - src/docker/build.ts
---

Build the release image in CI.
"#;
        let task = TaskContext::parse(content).unwrap();
        assert_eq!(task.id, "TASK-001");
        assert_eq!(task.name, "Containerize build");
        assert_eq!(task.category, "Infrastructure");
        assert_eq!(task.patterns, vec!["Pattern-TDD-001"]);
        assert_eq!(task.files, vec!["src/docker/build.ts"]);
        assert_eq!(task.description, "Build the release image in CI.");
    }

    #[test]
    fn test_frontmatter_description_wins_over_body() {
        let content = "---\nid: T-2\ndescription: from frontmatter\n---\nbody text\n";
        let task = TaskContext::parse(content).unwrap();
        assert_eq!(task.description, "from frontmatter");
    }

    #[test]
    fn test_parse_plain_yaml_task() {
        let content = "id: T-3\ncategory: UI\nfiles: [src/ui/button.tsx]\n";
        let task = TaskContext::parse(content).unwrap();
        assert_eq!(task.id, "T-3");
        assert_eq!(task.category, "UI");
        assert!(task.patterns.is_empty());
        // Name falls back to id.
        assert_eq!(task.name, "T-3");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\nid: T-4\r\ncategory: API\r\n---\r\nDescription\r\n";
        let task = TaskContext::parse(content).unwrap();
        assert_eq!(task.id, "T-4");
        assert_eq!(task.description, "Description");
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let content = "---\nid: T-5\n";
        let err = TaskContext::parse(content).unwrap_err();
        assert!(err.to_string().contains("closing '---'"));
    }

    #[test]
    fn test_missing_id_fails() {
        let err = TaskContext::parse("category: UI\nid: ''\n").unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_unknown_tracker_fields_preserved() {
        let content = "id: T-6\nstatus: in_progress\n";
        let task = TaskContext::parse(content).unwrap();
        assert!(task.extra.contains_key("status"));
    }

    #[test]
    fn test_load_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.md");
        std::fs::write(&path, "---\nid: T-7\n").unwrap();

        let err = TaskContext::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_builder_helpers() {
        let task = TaskContext::new("T-8", "Infrastructure")
            .with_patterns(["Pattern-TDD-001"])
            .with_files(["src/docker/build.ts"]);
        assert_eq!(task.category, "Infrastructure");
        assert_eq!(task.patterns.len(), 1);
        assert_eq!(task.files.len(), 1);
    }
}
