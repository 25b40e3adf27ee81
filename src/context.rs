//! Project context resolution for allot.
//!
//! All commands locate configuration, the agent catalog, and the audit log
//! through this module. Paths hang off a project root, which defaults to the
//! current working directory:
//!
//! ```text
//! <root>/
//!   .allot/
//!     config.yaml
//!     agents.yaml                  (optional versioned catalog)
//!     events/assignments.ndjson    (audit log)
//!   internal/agents/*-agent-context.md
//! ```

use crate::config::Config;
use crate::error::{AllotError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Directory holding allot state, relative to the project root.
pub const STATE_DIR: &str = ".allot";

/// Resolved paths for an allot project. All paths are absolute when the
/// root is absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Project root.
    pub root: PathBuf,

    /// `{root}/.allot/`
    pub state_dir: PathBuf,
}

impl ProjectContext {
    /// Resolve the project context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            AllotError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Ok(Self::resolve_from(cwd))
    }

    /// Resolve the project context from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let state_dir = root.join(STATE_DIR);
        Self { root, state_dir }
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    /// Load the config, falling back to defaults when the file is absent.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    /// Get the directory scanned for agent documents.
    pub fn agents_dir(&self, config: &Config) -> PathBuf {
        self.root.join(&config.agents_dir)
    }

    /// Get the path to the versioned agent catalog.
    pub fn agents_file(&self, config: &Config) -> PathBuf {
        self.root.join(&config.agents_file)
    }

    /// Get the path to the events directory.
    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    /// Get the path to the assignment audit log.
    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("assignments.ndjson")
    }
}
