//! Skill inference from agent context text.
//!
//! Skills are a coarse approximation: each keyword present in the text adds
//! one skill token, and every agent gets a baseline `execute:<type>` skill.

use std::collections::BTreeSet;

/// Keyword → skill token. Matching is case-insensitive substring search.
const SKILL_KEYWORDS: &[(&str, &str)] = &[
    ("test", "testing"),
    ("deploy", "deployment"),
    ("docker", "containers"),
    ("kubernetes", "containers"),
    ("database", "database"),
    ("sql", "database"),
    ("api", "api-design"),
    ("security", "security"),
    ("performance", "performance"),
    ("component", "ui-development"),
    ("refactor", "refactoring"),
    ("documentation", "documentation"),
    ("migration", "migrations"),
    ("ci/cd", "ci-cd"),
    ("pipeline", "ci-cd"),
];

/// Prefix of the baseline skill every agent carries.
pub const BASELINE_SKILL_PREFIX: &str = "execute";

/// The baseline skill for an agent type, e.g. `execute:infrastructure`.
pub fn baseline_skill(agent_type: &str) -> String {
    format!(
        "{}:{}",
        BASELINE_SKILL_PREFIX,
        agent_type.trim().to_lowercase()
    )
}

/// Infer the skill set for an agent from its context text.
pub fn infer_skills(text: &str, agent_type: &str) -> BTreeSet<String> {
    let haystack = text.to_lowercase();

    let mut skills: BTreeSet<String> = SKILL_KEYWORDS
        .iter()
        .filter(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, skill)| skill.to_string())
        .collect();

    skills.insert(baseline_skill(agent_type));
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_skill_always_present() {
        let skills = infer_skills("", "Infrastructure");
        assert_eq!(skills.len(), 1);
        assert!(skills.contains("execute:infrastructure"));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let skills = infer_skills("Builds DOCKER images and runs Tests", "infra");
        assert!(skills.contains("containers"));
        assert!(skills.contains("testing"));
    }

    #[test]
    fn duplicate_skill_tokens_collapse() {
        let skills = infer_skills("docker and kubernetes", "infra");
        let containers: Vec<_> = skills.iter().filter(|s| *s == "containers").collect();
        assert_eq!(containers.len(), 1);
    }

    #[test]
    fn unrelated_text_adds_nothing() {
        let skills = infer_skills("writes poems", "general");
        assert_eq!(
            skills.into_iter().collect::<Vec<_>>(),
            vec!["execute:general".to_string()]
        );
    }
}
