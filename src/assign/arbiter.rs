//! Assignment arbitration.
//!
//! # Decision Procedure
//!
//! 1. Score every agent and rank best first (ties go to skill overlap, then
//!    catalog order)
//! 2. Candidates within the similarity window of the best score are
//!    "similar"
//! 3. If the best score sits inside the escalation band and at least two
//!    candidates are similar, ask the decision gateway, offering the top
//!    similar candidates with the best one marked recommended
//! 4. A gateway answer naming an agent wins; a skip, an error or a timeout
//!    falls through to automatic selection
//! 5. Automatic selection takes the top-ranked agent. A zero best score is
//!    still assigned, marked as a fallback
//!
//! Assignment never fails for lack of a match. The only errors are an empty
//! catalog and a custom gateway answer naming an unknown agent.

use crate::assign::audit::AssignmentLog;
use crate::assign::decision::{AssignmentDecision, Reasoning};
use crate::assign::gateway::{
    DecisionGateway, DecisionOption, DecisionRequest, DecisionResponse, TimeoutGateway,
};
use crate::assign::scorer::{MatchResult, rank_agents};
use crate::config::{Config, EscalationConfig};
use crate::context::ProjectContext;
use crate::error::{AllotError, Result};
use crate::registry::AgentRegistry;
use crate::task::TaskContext;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tolerance for threshold comparisons.
const SCORE_EPSILON: f64 = 1e-9;

pub struct Arbiter {
    escalation: EscalationConfig,
    gateway: Box<dyn DecisionGateway>,
    log: AssignmentLog,
}

impl Arbiter {
    pub fn new(escalation: EscalationConfig, gateway: impl DecisionGateway + 'static) -> Self {
        Self {
            escalation,
            gateway: Box::new(gateway),
            log: AssignmentLog::new(),
        }
    }

    /// Build an arbiter from project configuration: the gateway is bounded by
    /// `gateway_timeout_seconds` and decisions are appended to the project's
    /// event file when `audit_events` is on.
    pub fn from_config(
        ctx: &ProjectContext,
        config: &Config,
        gateway: impl DecisionGateway + 'static,
    ) -> Self {
        let gateway = TimeoutGateway::new(
            gateway,
            Duration::from_secs(config.gateway_timeout_seconds),
        );
        Self::for_project(ctx, config, gateway)
    }

    /// Like [`Arbiter::from_config`], but the gateway is used as given. For
    /// gateways that enforce their own timeout.
    pub fn for_project(
        ctx: &ProjectContext,
        config: &Config,
        gateway: impl DecisionGateway + 'static,
    ) -> Self {
        let mut log = AssignmentLog::new();
        if config.audit_events {
            log = log.with_events_file(ctx.events_file());
        }
        Self::new(config.escalation.clone(), gateway).with_log(log)
    }

    pub fn with_log(mut self, log: AssignmentLog) -> Self {
        self.log = log;
        self
    }

    pub fn log_mut(&mut self) -> &mut AssignmentLog {
        &mut self.log
    }

    /// Choose an agent for `task`. Does not touch workloads.
    ///
    /// # Errors
    ///
    /// - `EmptyCatalog` if the registry holds no agents
    /// - `AgentNotFound` if the gateway answers with an unknown custom id
    pub fn assign_agent(
        &self,
        registry: &AgentRegistry,
        task: &TaskContext,
    ) -> Result<AssignmentDecision> {
        if registry.is_empty() {
            return Err(AllotError::EmptyCatalog);
        }

        let ranked = rank_agents(registry.agents(), task);
        for candidate in &ranked {
            debug!(
                task = %task.id,
                agent = candidate.agent.id(),
                score = candidate.score,
                "scored candidate"
            );
        }

        let Some(best) = ranked.first() else {
            return Err(AllotError::EmptyCatalog);
        };

        let similar = self.similar_candidates(&ranked);
        let mut decision = None;
        if self.should_escalate(best.score, similar.len()) {
            decision = self.escalate(registry, task, similar)?;
        }
        let decision = decision.unwrap_or_else(|| automatic(task, best));

        self.log.record(&decision);
        Ok(decision)
    }

    /// Choose an agent for `task` and record the task against its workload.
    pub fn assign_and_record(
        &self,
        registry: &mut AgentRegistry,
        task: &TaskContext,
    ) -> Result<AssignmentDecision> {
        let decision = self.assign_agent(registry, task)?;
        registry.record_task_assignment(&decision.agent_id, &decision.task_id)?;
        Ok(decision)
    }

    /// Whether a best score with `similar` close candidates is ambiguous
    /// enough to ask a human.
    pub fn should_escalate(&self, best_score: f64, similar: usize) -> bool {
        similar >= 2
            && best_score >= self.escalation.min_score - SCORE_EPSILON
            && best_score <= self.escalation.max_score + SCORE_EPSILON
    }

    /// Leading candidates within the similarity window of the best score.
    fn similar_candidates<'r, 'a>(&self, ranked: &'r [MatchResult<'a>]) -> &'r [MatchResult<'a>] {
        let Some(best) = ranked.first() else {
            return ranked;
        };
        let cutoff = best.score - self.escalation.similarity_window - SCORE_EPSILON;
        let count = ranked.iter().take_while(|m| m.score >= cutoff).count();
        &ranked[..count]
    }

    /// Ask the gateway. `Ok(None)` means fall through to automatic selection.
    fn escalate(
        &self,
        registry: &AgentRegistry,
        task: &TaskContext,
        similar: &[MatchResult<'_>],
    ) -> Result<Option<AssignmentDecision>> {
        let offered = &similar[..similar.len().min(self.escalation.max_options.max(1))];
        let candidates: Vec<(&str, f64)> =
            offered.iter().map(|m| (m.agent.id(), m.score)).collect();
        self.log.record_escalation(&task.id, &candidates);

        let request = self.build_request(task, similar, offered);
        let response = match self.gateway.request_decision(&request) {
            Ok(response) => response,
            Err(e) => {
                warn!(task = %task.id, error = %e, "decision gateway failed; assigning automatically");
                return Ok(None);
            }
        };

        match response {
            DecisionResponse::Selected(value) => {
                let Some(choice) = offered.iter().find(|m| m.agent.id() == value) else {
                    warn!(
                        task = %task.id,
                        value = %value,
                        "gateway selected a value that was not offered; assigning automatically"
                    );
                    return Ok(None);
                };
                info!(task = %task.id, agent = choice.agent.id(), "user selected agent");
                Ok(Some(AssignmentDecision {
                    task_id: task.id.clone(),
                    agent_id: choice.agent.id().to_string(),
                    agent_name: choice.agent.name().to_string(),
                    reasoning: Reasoning::UserChoice {
                        agent_name: choice.agent.name().to_string(),
                    },
                    score: choice.score,
                    escalated: true,
                }))
            }
            DecisionResponse::Custom(id) => {
                let id = id.trim();
                if id.is_empty() {
                    debug!(task = %task.id, "blank custom answer treated as skip");
                    return Ok(None);
                }
                let agent = registry.get_agent(id)?;
                info!(task = %task.id, agent = id, "user entered custom agent");
                let score = crate::assign::scorer::score(agent, task);
                Ok(Some(AssignmentDecision {
                    task_id: task.id.clone(),
                    agent_id: agent.id().to_string(),
                    agent_name: agent.name().to_string(),
                    reasoning: Reasoning::UserCustom {
                        agent_id: agent.id().to_string(),
                    },
                    score,
                    escalated: true,
                }))
            }
            DecisionResponse::Skip => {
                debug!(task = %task.id, "user skipped; assigning automatically");
                Ok(None)
            }
        }
    }

    fn build_request(
        &self,
        task: &TaskContext,
        similar: &[MatchResult<'_>],
        offered: &[MatchResult<'_>],
    ) -> DecisionRequest {
        let best_score = offered.first().map(|m| m.score).unwrap_or_default();

        let options = offered
            .iter()
            .enumerate()
            .map(|(i, m)| DecisionOption {
                label: m.agent.name().to_string(),
                description: format!(
                    "Score: {:.2} | Type: {} | {}",
                    m.score,
                    m.agent.agent_type(),
                    m.agent.summary().unwrap_or("no responsibilities listed")
                ),
                value: m.agent.id().to_string(),
                is_recommended: i == 0,
            })
            .collect();

        let mut metadata = BTreeMap::new();
        metadata.insert("task_id".to_string(), json!(task.id));
        metadata.insert("category".to_string(), json!(task.category));
        metadata.insert("patterns".to_string(), json!(task.patterns));
        metadata.insert("files".to_string(), json!(task.files));
        metadata.insert("best_score".to_string(), json!(best_score));

        DecisionRequest {
            title: format!("Choose an agent for {}", task.id),
            context: format!(
                "{} agents scored within {:.2} of the best match ({:.2}) for '{}'.",
                similar.len(),
                self.escalation.similarity_window,
                best_score,
                task.name
            ),
            options,
            metadata,
        }
    }
}

fn automatic(task: &TaskContext, best: &MatchResult<'_>) -> AssignmentDecision {
    let reasoning = if best.score > 0.0 {
        Reasoning::MatchScore { score: best.score }
    } else {
        Reasoning::Fallback
    };
    AssignmentDecision {
        task_id: task.id.clone(),
        agent_id: best.agent.id().to_string(),
        agent_name: best.agent.name().to_string(),
        reasoning,
        score: best.score,
        escalated: false,
    }
}
