//! Golden path refinement.
//!
//! Aligns a hand-written golden path against a real trajectory and
//! suggests a refined path in which each canonical step is replaced by the
//! concrete agent action it matched. Agent actions no canonical step
//! claimed are reported as candidates for extra steps or noise.
//!
//! Matching here is looser than in scoring: every quoted argument value is
//! blanked, so two actions of the same shape compare equal whatever their
//! recipients, URLs or paths.

use crate::align::align_by;
use crate::similarity::sequence_ratio;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("refine pattern is valid"))
}

/// Shape of an action: lower-cased, quoted values emptied, whitespace
/// collapsed. `send_message(recipient='Li Ming', content='Hi')` becomes
/// `send_message(recipient='', content='')`.
pub fn shape_key(action: &str) -> String {
    static SINGLE: OnceLock<Regex> = OnceLock::new();
    static DOUBLE: OnceLock<Regex> = OnceLock::new();
    static SPACE: OnceLock<Regex> = OnceLock::new();

    let lowered = action.trim().to_lowercase();
    let blanked = regex(&SINGLE, r"'[^']*'").replace_all(&lowered, "''");
    let blanked = regex(&DOUBLE, r#""[^"]*""#).replace_all(&blanked, "\"\"");
    regex(&SPACE, r"\s+").replace_all(&blanked, " ").into_owned()
}

/// Similarity of a canonical step and a parsed action by shape. The
/// canonical step is always the first operand.
pub fn shape_similarity(canonical: &str, parsed: &str) -> f64 {
    sequence_ratio(&shape_key(canonical), &shape_key(parsed))
}

/// One canonical step and what it matched in the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub canonical: String,
    pub matched: Option<String>,
    pub similarity: f64,
}

/// Refinement suggestion for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub task_name: String,
    pub suggested_golden_path: Vec<String>,
    pub matches: Vec<MatchResult>,
    pub unmatched_parsed_actions: Vec<String>,
    pub parsed_action_count: usize,
}

/// Aligns `canonical_actions` against `parsed_actions` and builds a
/// suggested golden path.
pub fn refine_golden_path(
    task_name: &str,
    parsed_actions: &[String],
    canonical_actions: &[String],
    min_similarity: f64,
) -> Refinement {
    let canonical_keys: Vec<String> = canonical_actions.iter().map(|a| shape_key(a)).collect();
    let parsed_keys: Vec<String> = parsed_actions.iter().map(|a| shape_key(a)).collect();
    let alignment = align_by(canonical_actions, parsed_actions, min_similarity, |step, idx| {
        sequence_ratio(&canonical_keys[step], &parsed_keys[idx])
    });

    let matches: Vec<MatchResult> = alignment
        .entries
        .iter()
        .map(|entry| MatchResult {
            canonical: entry.golden.clone(),
            matched: entry.matched.clone(),
            similarity: entry.similarity,
        })
        .collect();

    let suggested_golden_path = matches
        .iter()
        .map(|m| m.matched.clone().unwrap_or_else(|| m.canonical.clone()))
        .collect();

    let unmatched_parsed_actions = alignment
        .unmatched_agent_indices()
        .into_iter()
        .map(|idx| parsed_actions[idx].clone())
        .collect();

    Refinement {
        task_name: task_name.to_string(),
        suggested_golden_path,
        matches,
        unmatched_parsed_actions,
        parsed_action_count: parsed_actions.len(),
    }
}

/// Parses a golden path descriptions file:
///
/// ```text
/// Task 1: pm-schedule-meeting-1
/// - goto_url(url='http://the-agent-company.com:3000/home')
/// - finish()
/// ```
///
/// Tasks without any action lines are dropped.
pub fn parse_descriptions(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut tasks = BTreeMap::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("Task ") {
            if let Some((task, actions)) = current.take() {
                if !actions.is_empty() {
                    tasks.insert(task, actions);
                }
            }
            let name = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
            current = Some((name.to_string(), Vec::new()));
            continue;
        }

        if let (Some(action), Some((_, actions))) = (line.strip_prefix("- "), current.as_mut()) {
            actions.push(action.trim().to_string());
        }
    }

    if let Some((task, actions)) = current {
        if !actions.is_empty() {
            tasks.insert(task, actions);
        }
    }

    debug!(tasks = tasks.len(), "Parsed golden path descriptions");
    tasks
}

/// Loads a descriptions file; a missing file yields an empty map.
pub fn load_description_file(path: &Path) -> std::io::Result<BTreeMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_descriptions(&text))
}
