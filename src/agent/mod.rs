//! Agent catalog subsystem.
//!
//! - **Types**: definitions and runtime agent records
//! - **Document**: heuristic parsing of markdown agent context documents
//! - **Skills**: coarse skill inference from context text
//! - **Catalog**: the versioned `agents.yaml` record format
//! - **Loader**: discovery with per-document failure isolation and the
//!   default-agent fallback

mod catalog;
mod document;
mod loader;
mod skills;
mod types;

// Re-export public API
pub use catalog::{AgentCatalogFile, CATALOG_VERSION, CatalogEntry};
pub use document::{estimate_token_budget, parse_agent_document};
pub use loader::{
    DEFAULT_AGENT_ID, agent_id_from_path, default_agent, discover_documents, load_agents,
    load_document, scan_documents,
};
pub use skills::{baseline_skill, infer_skills};
pub use types::{Agent, AgentDefinition, AgentSource, Workload};
