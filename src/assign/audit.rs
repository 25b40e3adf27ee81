//! Assignment audit log.
//!
//! Every decision produces one audit line, emitted through `tracing` at info
//! level, handed to registered listeners, and optionally appended to the
//! NDJSON event file. Writing the file is best effort: a failure is logged
//! and never turns a made decision into an error.

use crate::assign::decision::AssignmentDecision;
use crate::events::{Event, EventAction, append_event};
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

type Listener = Box<dyn Fn(&AssignmentDecision) + Send + Sync>;

#[derive(Default)]
pub struct AssignmentLog {
    listeners: Vec<Listener>,
    events_file: Option<PathBuf>,
}

impl fmt::Debug for AssignmentLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignmentLog")
            .field("listeners", &self.listeners.len())
            .field("events_file", &self.events_file)
            .finish()
    }
}

impl AssignmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append events to the NDJSON file at `path`.
    pub fn with_events_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.events_file = Some(path.into());
        self
    }

    pub fn events_file(&self) -> Option<&Path> {
        self.events_file.as_deref()
    }

    /// Register a callback invoked for every decision.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&AssignmentDecision) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Record a final decision.
    pub fn record(&self, decision: &AssignmentDecision) {
        let line = decision.audit_line();
        info!(
            task = %decision.task_id,
            agent = %decision.agent_id,
            reasoning = %decision.reasoning,
            escalated = decision.escalated,
            "{}",
            line
        );

        for listener in &self.listeners {
            listener(decision);
        }

        self.append(
            Event::new(EventAction::Assign)
                .with_task(&decision.task_id)
                .with_details(json!({
                    "agent": decision.agent_id,
                    "reasoning": decision.reasoning,
                    "score": decision.score,
                    "escalated": decision.escalated,
                    "line": line,
                })),
        );
    }

    /// Record that close candidates were put to the decision gateway.
    pub fn record_escalation(&self, task_id: &str, candidates: &[(&str, f64)]) {
        info!(
            task = task_id,
            candidates = candidates.len(),
            "escalating assignment to decision gateway"
        );

        let candidates: Vec<_> = candidates
            .iter()
            .map(|(id, score)| json!({"agent": id, "score": score}))
            .collect();
        self.append(
            Event::new(EventAction::Escalate)
                .with_task(task_id)
                .with_details(json!({ "candidates": candidates })),
        );
    }

    fn append(&self, event: Event) {
        let Some(path) = &self.events_file else {
            return;
        };
        if let Err(e) = append_event(path, &event) {
            warn!(path = %path.display(), error = %e, "failed to write assignment event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::decision::Reasoning;
    use crate::events::read_events;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn decision() -> AssignmentDecision {
        AssignmentDecision {
            task_id: "T-1".to_string(),
            agent_id: "infra".to_string(),
            agent_name: "Infra Agent".to_string(),
            reasoning: Reasoning::MatchScore { score: 0.7 },
            score: 0.7,
            escalated: false,
        }
    }

    #[test]
    fn test_listeners_receive_each_decision() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut log = AssignmentLog::new();
        let sink = Arc::clone(&seen);
        log.add_listener(move |d| sink.lock().unwrap().push(d.audit_line()));

        log.record(&decision());
        log.record(&decision());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], "Task T-1 → Agent infra: Match score: 0.70");
    }

    #[test]
    fn test_events_file_gets_assign_and_escalate_events() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".allot/events/assignments.ndjson");
        let log = AssignmentLog::new().with_events_file(&path);

        log.record_escalation("T-1", &[("infra", 0.7), ("ops", 0.68)]);
        log.record(&decision());

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::Escalate);
        assert_eq!(events[0].details["candidates"][1]["agent"], "ops");
        assert_eq!(events[1].action, EventAction::Assign);
        assert_eq!(events[1].details["agent"], "infra");
        assert_eq!(events[1].details["reasoning"]["kind"], "match_score");
        assert_eq!(
            events[1].details["line"],
            "Task T-1 → Agent infra: Match score: 0.70"
        );
    }

    #[test]
    fn test_unwritable_events_file_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be.
        let path = temp_dir.path().join("events");
        std::fs::create_dir_all(&path).unwrap();

        let log = AssignmentLog::new().with_events_file(&path);
        log.record(&decision());
    }
}
