//! Task assignment.
//!
//! - **Scorer**: weighted category/pattern/path match between agent and task
//! - **Arbiter**: picks an agent, escalating close calls to a human
//! - **Gateway**: the human decision interface and its adapters
//! - **Audit**: the per-decision log with listeners and an event file

mod arbiter;
mod audit;
mod decision;
pub mod gateway;
pub mod scorer;

// Re-export public API
pub use arbiter::Arbiter;
pub use audit::AssignmentLog;
pub use decision::{AssignmentDecision, Reasoning};
pub use gateway::{
    DecisionGateway, DecisionOption, DecisionRequest, DecisionResponse, GatewayError, NoGateway,
    TerminalGateway, TimeoutGateway,
};
pub use scorer::{MatchResult, ScoreBreakdown, rank_agents, score, score_breakdown, task_skills};
