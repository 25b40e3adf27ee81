//! Agent context document parsing.
//!
//! Agent documents are human-authored markdown. Nothing is enforced beyond a
//! few recognizable conventions:
//!
//! ```text
//! # Infrastructure Agent
//!
//! **Type:** Infrastructure
//! **Version:** 1.2
//! **Last Updated:** 2025-10-01
//!
//! ## Core Responsibilities
//! - Own CI pipelines
//!
//! ## Performance Targets
//! - Build time: < 5 min
//!
//! ## Common Pitfalls
//! - Forgetting cache keys
//! ```
//!
//! Patterns (`Pattern-TDD-001`) and path-shaped strings (`src/docker`,
//! `crates/core/src/lib.rs`) are extracted from anywhere in the text.

use crate::agent::types::AgentDefinition;
use crate::error::{AllotError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| label_regex("(?:Agent )?Type"));
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| label_regex("Version"));
static UPDATED_REGEX: LazyLock<Regex> = LazyLock::new(|| label_regex("Last Updated"));

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+?)\s*$").expect("Invalid title regex"));

static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+?)\s*$").expect("Invalid bullet regex")
});

static PATTERN_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bPattern-[A-Z][A-Z0-9]*(?:-[A-Z][A-Z0-9]*)*-\d{3}\b")
        .expect("Invalid pattern id regex")
});

/// Path shapes: plain `dir/file.ext`, then workspace crate/package paths and
/// `src/` subtrees, which may be bare directories.
static PATH_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:[A-Za-z0-9_.-]+/)+[A-Za-z0-9_-]+\.[A-Za-z0-9]+\b",
        r"\b(?:crates|packages)/[A-Za-z0-9_-]+(?:/[A-Za-z0-9_.-]+)*",
        r"\bsrc/[A-Za-z0-9_-]+(?:/[A-Za-z0-9_-]+)*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid path regex"))
    .collect()
});

/// Build a regex matching `**Label:** value` / `Label: value` lines.
fn label_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?mi)^\s*(?:[-*]\s+)?\**{}\**\s*:\s*\**\s*(.+?)\s*$",
        label
    ))
    .expect("Invalid label regex")
}

/// Parse an agent document into a definition.
///
/// `id` is derived by the caller from the filename and doubles as the name
/// when the document has no top-level heading.
///
/// A document is rejected when it is blank or carries neither a top-level
/// heading nor a `Type:` line.
pub fn parse_agent_document(id: &str, content: &str) -> Result<AgentDefinition> {
    let content = content.replace("\r\n", "\n");

    if content.trim().is_empty() {
        return Err(AllotError::UserError(format!(
            "agent document '{}' is empty",
            id
        )));
    }

    let title = capture(&TITLE_REGEX, &content);
    let agent_type = capture(&TYPE_REGEX, &content);

    if title.is_none() && agent_type.is_none() {
        return Err(AllotError::UserError(format!(
            "agent document '{}' has no '# Title' heading and no 'Type:' line",
            id
        )));
    }

    Ok(AgentDefinition {
        id: id.to_string(),
        name: title.unwrap_or_else(|| id.to_string()),
        agent_type: agent_type.unwrap_or_else(|| "general".to_string()),
        version: capture(&VERSION_REGEX, &content),
        last_updated: capture(&UPDATED_REGEX, &content),
        responsibilities: section_items(&content, "responsibilities"),
        patterns: extract_patterns(&content),
        performance_targets: performance_targets(&content),
        common_pitfalls: section_items(&content, "pitfalls"),
        relevant_code_paths: extract_code_paths(&content),
    })
}

/// Capacity heuristic: roughly one token per four characters of context.
pub fn estimate_token_budget(content: &str) -> usize {
    content.chars().count().div_ceil(4)
}

fn capture(regex: &Regex, content: &str) -> Option<String> {
    regex
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| clean_inline(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Strip bold/code markers left around inline values.
fn clean_inline(text: &str) -> String {
    text.replace("**", "").replace('`', "").trim().to_string()
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// `##` or deeper. The `#` title never opens a section.
fn is_section_heading(line: &str) -> bool {
    line.trim_start().starts_with("##")
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3
        && (trimmed.chars().all(|c| c == '-')
            || trimmed.chars().all(|c| c == '*')
            || trimmed.chars().all(|c| c == '_'))
}

/// Lines of the first `##`+ section whose heading contains `keyword`, up to
/// the next heading or horizontal rule.
fn section_lines<'a>(content: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut lines = content.lines();

    let found = lines
        .by_ref()
        .any(|line| is_section_heading(line) && line.to_lowercase().contains(keyword));
    if !found {
        return Vec::new();
    }

    lines
        .take_while(|line| !is_heading(line) && !is_rule(line))
        .collect()
}

/// Bulleted items under the section whose heading contains `keyword`.
fn section_items(content: &str, keyword: &str) -> Vec<String> {
    section_lines(content, keyword)
        .into_iter()
        .filter_map(|line| BULLET_REGEX.captures(line))
        .filter_map(|c| c.get(1).map(|m| clean_inline(m.as_str())))
        .filter(|item| !item.is_empty())
        .collect()
}

/// `key: value` pairs under the performance targets section, bulleted or not.
fn performance_targets(content: &str) -> BTreeMap<String, String> {
    let mut targets = BTreeMap::new();

    for line in section_lines(content, "performance") {
        let text = match BULLET_REGEX.captures(line).and_then(|c| c.get(1)) {
            Some(m) => m.as_str(),
            None => line.trim(),
        };
        if let Some((key, value)) = text.split_once(':') {
            let key = clean_inline(key);
            let value = clean_inline(value);
            if !key.is_empty() && !value.is_empty() {
                targets.insert(key, value);
            }
        }
    }

    targets
}

fn extract_patterns(content: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    for m in PATTERN_ID_REGEX.find_iter(content) {
        push_unique(&mut patterns, m.as_str());
    }
    patterns
}

fn extract_code_paths(content: &str) -> Vec<String> {
    let mut paths = Vec::new();

    for regex in PATH_REGEXES.iter() {
        for m in regex.find_iter(content) {
            // Skip the host/path tail of URLs.
            let preceding = content[..m.start()].chars().next_back();
            if matches!(preceding, Some('/') | Some(':')) {
                continue;
            }
            let path = m
                .as_str()
                .trim_start_matches("./")
                .trim_end_matches(['.', '/']);
            if path.contains('/') {
                push_unique(&mut paths, path);
            }
        }
    }

    paths
}

fn push_unique(items: &mut Vec<String>, value: &str) {
    if !items.iter().any(|existing| existing == value) {
        items.push(value.to_string());
    }
}
