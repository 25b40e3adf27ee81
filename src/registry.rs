//! Agent registry: the in-memory catalog plus workload tracking.
//!
//! A registry is an explicit value owned by its caller; there is no process
//! global. It is not internally synchronized: callers that share one across
//! threads wrap it in a `Mutex` so workload updates are not lost.

use crate::agent::{Agent, Workload, load_agents};
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Where a registry was loaded from, kept so it can be reloaded.
#[derive(Debug, Clone)]
struct LoadOrigin {
    ctx: ProjectContext,
    config: Config,
}

/// The agent catalog. Always holds at least one agent.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    origin: Option<LoadOrigin>,
}

impl AgentRegistry {
    /// Load the catalog for a project (see [`crate::agent::load_agents`]).
    pub fn load(ctx: &ProjectContext, config: &Config) -> Result<Self> {
        let agents = load_agents(ctx, config)?;
        let mut registry = Self::from_agents(agents)?;
        registry.origin = Some(LoadOrigin {
            ctx: ctx.clone(),
            config: config.clone(),
        });
        Ok(registry)
    }

    /// Build a registry from agents already in memory.
    ///
    /// # Errors
    ///
    /// - `EmptyCatalog` if `agents` is empty
    /// - `UserError` if two agents share an id
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self> {
        if agents.is_empty() {
            return Err(AllotError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id()) {
                return Err(AllotError::UserError(format!(
                    "duplicate agent id '{}' in catalog",
                    agent.id()
                )));
            }
        }

        Ok(Self {
            agents,
            origin: None,
        })
    }

    /// Rebuild the catalog from its original source.
    ///
    /// Task assignments are carried over for agents whose id survives the
    /// reload; assignments to agents that disappeared are dropped.
    pub fn reload(&mut self) -> Result<()> {
        let origin = self.origin.clone().ok_or_else(|| {
            AllotError::UserError(
                "registry was built in memory and has no source to reload from".to_string(),
            )
        })?;

        let mut agents = load_agents(&origin.ctx, &origin.config)?;
        for agent in &mut agents {
            if let Some(previous) = self.find(agent.id()) {
                agent.current_tasks = previous.current_tasks.clone();
            }
        }

        let mut reloaded = Self::from_agents(agents)?;
        reloaded.origin = Some(origin);
        debug!(agents = reloaded.len(), "reloaded agent registry");
        *self = reloaded;
        Ok(())
    }

    /// All agents in catalog order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The first agent in catalog order.
    pub fn first(&self) -> Option<&Agent> {
        self.agents.first()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent by id.
    pub fn find(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Look up an agent by id, failing with `AgentNotFound`.
    pub fn get_agent(&self, id: &str) -> Result<&Agent> {
        self.find(id).ok_or_else(|| self.not_found(id))
    }

    /// Agents whose type matches case-insensitively.
    pub fn agents_by_type(&self, agent_type: &str) -> Vec<&Agent> {
        self.agents
            .iter()
            .filter(|a| a.agent_type().eq_ignore_ascii_case(agent_type))
            .collect()
    }

    /// Agents carrying the given skill token.
    pub fn agents_with_skill(&self, skill: &str) -> Vec<&Agent> {
        self.agents.iter().filter(|a| a.has_skill(skill)).collect()
    }

    // =========================================================================
    // Workload tracking
    // =========================================================================

    /// Record that `task_id` is assigned to `agent_id`.
    ///
    /// Returns `Ok(false)` without changing anything if the pair is already
    /// recorded. The concurrency limit is advisory: going over it logs a
    /// warning but the assignment is still recorded.
    pub fn record_task_assignment(&mut self, agent_id: &str, task_id: &str) -> Result<bool> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id() == agent_id)
            .ok_or_else(|| self.not_found(agent_id))?;
        let agent = &mut self.agents[index];

        if agent.current_tasks.iter().any(|t| t == task_id) {
            debug!(agent = agent_id, task = task_id, "task already recorded");
            return Ok(false);
        }

        agent.current_tasks.push(task_id.to_string());

        let workload = agent.workload();
        if workload.is_over_capacity() {
            warn!(
                agent = agent_id,
                current = workload.current,
                max = workload.max,
                "agent is over its parallel task limit"
            );
        }
        Ok(true)
    }

    /// Current workload for an agent.
    pub fn get_agent_workload(&self, agent_id: &str) -> Result<Workload> {
        self.get_agent(agent_id).map(Agent::workload)
    }

    /// Workload for every agent, in catalog order.
    pub fn workloads(&self) -> Vec<(&str, Workload)> {
        self.agents.iter().map(|a| (a.id(), a.workload())).collect()
    }

    fn not_found(&self, id: &str) -> AllotError {
        AllotError::AgentNotFound {
            id: id.to_string(),
            available: self
                .agents
                .iter()
                .map(|a| a.id())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
