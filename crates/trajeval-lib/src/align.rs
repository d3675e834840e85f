//! Greedy alignment of a golden path against an agent path.
//!
//! Each golden step, in order, takes the best still-unused agent step. An
//! early golden step can take an agent action that a later golden step
//! would have matched better; there is no backtracking. Scores produced
//! downstream depend on this exact behaviour.

use crate::normalize::normalize_path;
use crate::similarity::key_similarity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Minimum similarity for a golden step to count as matched.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.45;

/// Outcome for one golden step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEntry {
    pub golden: String,
    pub matched: Option<String>,
    /// Index of the matched action in the agent path.
    pub agent_index: Option<usize>,
    pub similarity: f64,
}

impl AlignmentEntry {
    pub fn is_matched(&self) -> bool {
        self.agent_index.is_some()
    }
}

/// Alignment of a whole golden path, one entry per golden step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alignment {
    pub entries: Vec<AlignmentEntry>,
    pub consumed: BTreeSet<usize>,
    pub agent_len: usize,
}

impl Alignment {
    pub fn matched_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_matched()).count()
    }

    /// Agent indices of matched entries, in golden-path order.
    pub fn matched_agent_indices(&self) -> Vec<usize> {
        self.entries.iter().filter_map(|e| e.agent_index).collect()
    }

    /// Agent steps no golden step claimed (extra or noise actions).
    pub fn unmatched_agent_indices(&self) -> Vec<usize> {
        (0..self.agent_len)
            .filter(|idx| !self.consumed.contains(idx))
            .collect()
    }
}

/// Aligns `golden` against `agent`, consuming each agent step at most once.
pub fn align_actions(golden: &[String], agent: &[String], min_similarity: f64) -> Alignment {
    let golden_keys = normalize_path(golden);
    let agent_keys = normalize_path(agent);
    align_by(golden, agent, min_similarity, |step, idx| {
        key_similarity(&golden_keys[step], &agent_keys[idx])
    })
}

/// Greedy alignment with a caller-supplied similarity between golden step
/// `step` and agent step `idx`. A candidate replaces the current best only
/// on a strictly higher score, so ties go to the earliest agent step.
pub fn align_by<F>(
    golden: &[String],
    agent: &[String],
    min_similarity: f64,
    similarity: F,
) -> Alignment
where
    F: Fn(usize, usize) -> f64,
{
    let mut entries = Vec::with_capacity(golden.len());
    let mut consumed = BTreeSet::new();

    for (step, golden_action) in golden.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;

        for idx in 0..agent.len() {
            if consumed.contains(&idx) {
                continue;
            }
            let score = similarity(step, idx);
            let best_score = best.map_or(0.0, |(_, s)| s);
            if score > best_score {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score >= min_similarity => {
                debug!(step, agent_index = idx, score, "golden step matched");
                consumed.insert(idx);
                entries.push(AlignmentEntry {
                    golden: golden_action.clone(),
                    matched: Some(agent[idx].clone()),
                    agent_index: Some(idx),
                    similarity: score,
                });
            }
            _ => {
                debug!(step, best = ?best, "golden step unmatched");
                entries.push(AlignmentEntry {
                    golden: golden_action.clone(),
                    matched: None,
                    agent_index: None,
                    similarity: 0.0,
                });
            }
        }
    }

    Alignment {
        entries,
        consumed,
        agent_len: agent.len(),
    }
}
