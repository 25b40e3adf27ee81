//! Implementation of the `allot import` command.
//!
//! Converts the markdown agent documents into the versioned `agents.yaml`
//! catalog. Once the catalog exists the loader reads it instead of the
//! documents.

use crate::agent::{AgentCatalogFile, scan_documents};
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::path::PathBuf;

/// Execute the `allot import` command.
pub fn cmd_import(args: ImportArgs) -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let config = ctx.load_config()?;

    let (path, count) = import_documents(&ctx, &config, args.force)?;

    println!("Imported {} agent(s) into {}", count, path.display());
    Ok(())
}

/// Write `agents.yaml` from the document directory. Returns the catalog path
/// and the number of agents written.
pub(crate) fn import_documents(
    ctx: &ProjectContext,
    config: &Config,
    force: bool,
) -> Result<(PathBuf, usize)> {
    let path = ctx.agents_file(config);
    if path.exists() && !force {
        return Err(AllotError::UserError(format!(
            "agent catalog '{}' already exists.\n\n\
             Re-run with `allot import --force` to overwrite it.",
            path.display()
        )));
    }

    let agents_dir = ctx.agents_dir(config);
    let agents = scan_documents(&agents_dir, config);
    if agents.is_empty() {
        return Err(AllotError::UserError(format!(
            "no agent documents found in '{}' (expected files named '<id>{}')",
            agents_dir.display(),
            config.agent_file_suffix
        )));
    }

    let catalog = AgentCatalogFile::from_agents(&agents);
    atomic_write_file(&path, &catalog.to_yaml()?)?;

    if config.audit_events {
        let ids: Vec<&str> = agents.iter().map(|a| a.id()).collect();
        let event = Event::new(EventAction::Import).with_details(json!({
            "catalog": path.display().to_string(),
            "agents": ids,
        }));
        append_event(&ctx.events_file(), &event)?;
    }

    Ok((path, catalog.agent_count()))
}
