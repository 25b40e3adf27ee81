//! Task/agent match scoring.
//!
//! A score is a weighted sum of three independent signals:
//!
//! | Signal            | Weight | Value                                              |
//! |-------------------|--------|----------------------------------------------------|
//! | Category match    | 0.4    | 1 if agent type == task category (ignoring case)   |
//! | Pattern overlap   | 0.3    | shared task patterns / task patterns               |
//! | File-path affinity| 0.3    | task files touching any agent code path / files    |
//!
//! A same-category agent with no other overlap scores 0.4, which sits below
//! the escalation band, so category alone never makes a pick ambiguous.
//!
//! Skills do not contribute to the score. When two agents tie, the one
//! holding more of the skills inferred from the task text ranks first.

use crate::agent::{Agent, infer_skills};
use crate::task::TaskContext;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

pub const CATEGORY_WEIGHT: f64 = 0.4;
pub const PATTERN_WEIGHT: f64 = 0.3;
pub const PATH_WEIGHT: f64 = 0.3;

/// Per-signal contributions of a score, each already in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub category: f64,
    pub patterns: f64,
    pub paths: f64,
}

impl ScoreBreakdown {
    /// Weighted total in `[0, 1]`.
    pub fn total(&self) -> f64 {
        let raw = CATEGORY_WEIGHT * self.category
            + PATTERN_WEIGHT * self.patterns
            + PATH_WEIGHT * self.paths;
        // Totals are compared against fixed thresholds; drop float noise so
        // e.g. a full match is exactly 1.0.
        ((raw * 1e9).round() / 1e9).clamp(0.0, 1.0)
    }
}

/// One agent's score for a task.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub agent: &'a Agent,
    pub score: f64,
    /// Task skills the agent holds. Only used to order equal scores.
    pub skill_overlap: usize,
}

/// Score an agent against a task. Always within `[0, 1]`.
pub fn score(agent: &Agent, task: &TaskContext) -> f64 {
    score_breakdown(agent, task).total()
}

/// Score an agent against a task, keeping the individual signals.
pub fn score_breakdown(agent: &Agent, task: &TaskContext) -> ScoreBreakdown {
    ScoreBreakdown {
        category: category_match(agent, task),
        patterns: pattern_overlap(agent, task),
        paths: path_affinity(agent, task),
    }
}

/// Score every agent and sort best first. Equal scores are ordered by skill
/// overlap with the task, then keep catalog order.
pub fn rank_agents<'a>(agents: &'a [Agent], task: &TaskContext) -> Vec<MatchResult<'a>> {
    let wanted = task_skills(task);
    let mut ranked: Vec<MatchResult<'a>> = agents
        .iter()
        .map(|agent| MatchResult {
            agent,
            score: score(agent, task),
            skill_overlap: agent.skills.intersection(&wanted).count(),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.skill_overlap.cmp(&a.skill_overlap))
    });
    ranked
}

/// Skills a task calls for, inferred from its name and description the same
/// way agent skills are inferred from their documents.
pub fn task_skills(task: &TaskContext) -> BTreeSet<String> {
    infer_skills(&format!("{}\n{}", task.name, task.description), &task.category)
}

fn category_match(agent: &Agent, task: &TaskContext) -> f64 {
    let agent_type = agent.agent_type().trim();
    if !agent_type.is_empty() && agent_type.eq_ignore_ascii_case(task.category.trim()) {
        1.0
    } else {
        0.0
    }
}

fn pattern_overlap(agent: &Agent, task: &TaskContext) -> f64 {
    let wanted: HashSet<&str> = task.patterns.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return 0.0;
    }

    let shared = wanted
        .iter()
        .filter(|p| agent.definition.patterns.iter().any(|ap| ap == *p))
        .count();
    shared as f64 / wanted.len() as f64
}

fn path_affinity(agent: &Agent, task: &TaskContext) -> f64 {
    let code_paths = &agent.definition.relevant_code_paths;
    if task.files.is_empty() || code_paths.is_empty() {
        return 0.0;
    }

    let matcher = PathMatcher::new(code_paths);
    let touching = task.files.iter().filter(|f| matcher.matches(f)).count();
    touching as f64 / task.files.len() as f64
}

/// Matches task files against an agent's code paths: substring in either
/// direction for plain entries, glob matching for entries with wildcards.
struct PathMatcher<'a> {
    plain: Vec<&'a str>,
    globs: Option<GlobSet>,
}

impl<'a> PathMatcher<'a> {
    fn new(code_paths: &'a [String]) -> Self {
        let mut plain = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut has_globs = false;

        for path in code_paths.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if is_glob(path) {
                match Glob::new(path) {
                    Ok(glob) => {
                        builder.add(glob);
                        has_globs = true;
                    }
                    // Not a valid glob; fall back to substring matching.
                    Err(_) => plain.push(path),
                }
            } else {
                plain.push(path);
            }
        }

        let globs = if has_globs { builder.build().ok() } else { None };
        Self { plain, globs }
    }

    fn matches(&self, file: &str) -> bool {
        let file = file.trim();
        if file.is_empty() {
            return false;
        }
        if self
            .plain
            .iter()
            .any(|p| file.contains(p) || p.contains(file))
        {
            return true;
        }
        self.globs.as_ref().is_some_and(|g| g.is_match(file))
    }
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '[', '{'])
}
