use serde::Serialize;
use std::fmt;

/// Why an agent was chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reasoning {
    /// Best automatic score.
    MatchScore { score: f64 },
    /// Human picked one of the offered options.
    UserChoice { agent_name: String },
    /// Human typed an agent id.
    UserCustom { agent_id: String },
    /// Nothing matched; the top-ranked agent was used anyway.
    Fallback,
}

impl fmt::Display for Reasoning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reasoning::MatchScore { score } => write!(f, "Match score: {:.2}", score),
            Reasoning::UserChoice { agent_name } => write!(f, "User choice: {}", agent_name),
            Reasoning::UserCustom { agent_id } => write!(f, "User choice: custom ({})", agent_id),
            Reasoning::Fallback => write!(f, "Fallback assignment (no good matches)"),
        }
    }
}

/// The outcome of assigning one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentDecision {
    pub task_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub reasoning: Reasoning,
    /// Score of the chosen agent.
    pub score: f64,
    /// Whether the decision gateway was consulted.
    pub escalated: bool,
}

impl AssignmentDecision {
    /// The human-readable audit line.
    pub fn audit_line(&self) -> String {
        format!(
            "Task {} → Agent {}: {}",
            self.task_id, self.agent_id, self.reasoning
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_strings() {
        assert_eq!(
            Reasoning::MatchScore { score: 0.7 }.to_string(),
            "Match score: 0.70"
        );
        assert_eq!(
            Reasoning::UserChoice {
                agent_name: "Infra Agent".to_string()
            }
            .to_string(),
            "User choice: Infra Agent"
        );
        assert_eq!(
            Reasoning::UserCustom {
                agent_id: "security".to_string()
            }
            .to_string(),
            "User choice: custom (security)"
        );
        assert_eq!(
            Reasoning::Fallback.to_string(),
            "Fallback assignment (no good matches)"
        );
    }

    #[test]
    fn test_audit_line() {
        let decision = AssignmentDecision {
            task_id: "T-1".to_string(),
            agent_id: "infra".to_string(),
            agent_name: "Infra Agent".to_string(),
            reasoning: Reasoning::MatchScore { score: 1.0 },
            score: 1.0,
            escalated: false,
        };
        assert_eq!(decision.audit_line(), "Task T-1 → Agent infra: Match score: 1.00");
    }

    #[test]
    fn test_reasoning_serializes_with_kind_tag() {
        let json = serde_json::to_value(Reasoning::Fallback).unwrap();
        assert_eq!(json["kind"], "fallback");
    }
}
