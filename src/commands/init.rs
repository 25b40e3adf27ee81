//! Implementation of the `allot init` command.
//!
//! 1. Creates `.allot/` and `.allot/events/`
//! 2. Writes `.allot/config.yaml` with defaults (if missing)
//! 3. Records an `init` event when audit events are enabled
//!
//! Running it again is harmless: an existing config is validated, not
//! rewritten.

use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::fs;

/// Execute the `allot init` command.
pub fn cmd_init() -> Result<()> {
    let ctx = ProjectContext::resolve()?;
    let created = init_project(&ctx)?;
    let config = ctx.load_config()?;

    if created {
        println!("Initialized allot.");
    } else {
        println!("allot is already initialized; configuration left unchanged.");
    }
    println!();
    println!("Config:       {}", ctx.config_path().display());
    println!("Agents dir:   {}", ctx.agents_dir(&config).display());
    println!("Agents file:  {}", ctx.agents_file(&config).display());
    println!("Audit log:    {}", ctx.events_file().display());
    println!();
    println!(
        "Add agent documents named '<id>{}' to the agents dir, or run `allot import`.",
        config.agent_file_suffix
    );

    Ok(())
}

/// Create the state directory and default config. Returns `false` when a
/// config already existed.
pub(crate) fn init_project(ctx: &ProjectContext) -> Result<bool> {
    fs::create_dir_all(ctx.events_dir()).map_err(|e| {
        AllotError::UserError(format!(
            "failed to create '{}': {}",
            ctx.events_dir().display(),
            e
        ))
    })?;

    let config_path = ctx.config_path();
    if config_path.exists() {
        // Surface a broken config now rather than on the first assignment.
        ctx.load_config()?;
        return Ok(false);
    }

    let config = Config::default();
    atomic_write_file(&config_path, &config.to_yaml()?)?;

    if config.audit_events {
        let event = Event::new(EventAction::Init).with_details(json!({
            "config": config_path.display().to_string(),
        }));
        append_event(&ctx.events_file(), &event)?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::read_events;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config_and_event() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = ProjectContext::resolve_from(temp_dir.path());

        assert!(init_project(&ctx).unwrap());

        let config = Config::load(ctx.config_path()).unwrap();
        assert_eq!(config.max_parallel_tasks, 3);
        let events = read_events(&ctx.events_file()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventAction::Init);
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = ProjectContext::resolve_from(temp_dir.path());
        init_project(&ctx).unwrap();
        fs::write(ctx.config_path(), "max_parallel_tasks: 7\n").unwrap();

        assert!(!init_project(&ctx).unwrap());

        let content = fs::read_to_string(ctx.config_path()).unwrap();
        assert_eq!(content, "max_parallel_tasks: 7\n");
        assert_eq!(read_events(&ctx.events_file()).unwrap().len(), 1);
    }

    #[test]
    fn test_init_rejects_invalid_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = ProjectContext::resolve_from(temp_dir.path());
        fs::create_dir_all(&ctx.state_dir).unwrap();
        fs::write(ctx.config_path(), "max_parallel_tasks: [oops\n").unwrap();

        let err = init_project(&ctx).unwrap_err();
        assert!(matches!(err, AllotError::ConfigError(_)));
    }

    #[test]
    #[serial]
    fn test_cmd_init_uses_current_directory() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        cmd_init().unwrap();

        assert!(temp_dir.path().join(".allot").join("config.yaml").exists());
    }
}
