//! Path metrics computed from an alignment.
//!
//! - coverage: how many golden steps the agent performed
//! - order: whether the matched steps happened in golden order
//! - length efficiency: how much longer than the golden path the agent ran
//! - redundancy: verbatim repetition that looks like looping

use crate::align::Alignment;
use crate::normalize::normalize_path;
use std::collections::HashMap;

/// Consecutive actions inspected together by the windowed redundancy check.
pub const REDUNDANCY_WINDOW: usize = 5;
/// Occurrences inside one window before a key counts as repeated.
pub const WINDOW_REPEAT_THRESHOLD: usize = 3;
/// Occurrences across the whole path before a key counts as looping.
pub const OVERALL_REPEAT_THRESHOLD: usize = 10;
/// Coverage at which length and redundancy penalties are dampened.
pub const HIGH_COVERAGE: f64 = 0.9;

/// Fraction of golden steps that found a match. An empty golden path is
/// fully covered.
pub fn coverage(alignment: &Alignment) -> f64 {
    if alignment.entries.is_empty() {
        return 1.0;
    }
    alignment.matched_count() as f64 / alignment.entries.len() as f64
}

/// Fraction of consecutive matched pairs whose agent indices increase.
///
/// Zero or one match is trivially in order.
pub fn order_score(alignment: &Alignment) -> f64 {
    let indices = alignment.matched_agent_indices();
    if indices.len() <= 1 {
        return 1.0;
    }
    let pairs = indices.len() - 1;
    let ordered = indices.windows(2).filter(|w| w[0] < w[1]).count();
    ordered as f64 / pairs as f64
}

/// Agent length divided by golden length, `None` when the golden path is
/// empty but the agent path is not.
pub fn path_length_ratio(agent_len: usize, golden_len: usize) -> Option<f64> {
    match (agent_len, golden_len) {
        (0, 0) => Some(1.0),
        (_, 0) => None,
        (agent, golden) => Some(agent as f64 / golden as f64),
    }
}

/// Raw length penalty for a path length ratio, before coverage dampening.
pub fn length_penalty(ratio: f64) -> f64 {
    if ratio <= 1.0 {
        0.0
    } else if ratio <= 1.5 {
        (ratio - 1.0) * 0.2
    } else if ratio <= 2.0 {
        0.1 + (ratio - 1.5) * 0.3
    } else {
        (0.25 + (ratio - 2.0) * 0.15).min(0.5)
    }
}

/// Length efficiency in `[0, 1]`.
///
/// Shorter paths are never penalized here; missing work is what coverage
/// measures. The penalty is halved once coverage reaches [`HIGH_COVERAGE`].
pub fn length_efficiency(agent_len: usize, golden_len: usize, coverage: f64) -> f64 {
    let Some(ratio) = path_length_ratio(agent_len, golden_len) else {
        return 0.0;
    };
    let mut penalty = length_penalty(ratio);
    if coverage >= HIGH_COVERAGE {
        penalty /= 2.0;
    }
    1.0 - penalty
}

/// Repetition penalty in `[0, 1]` for an agent path.
///
/// Computed on normalized keys, so actions of the same kind on different
/// targets are not repeats. The windowed check catches tight loops; the
/// whole-path check catches slow ones and counts half.
pub fn redundancy_penalty(agent: &[String]) -> f64 {
    if agent.len() <= 1 {
        return 0.0;
    }
    let keys = normalize_path(agent);
    let window = window_penalty(&keys);
    let overall = overall_penalty(&keys);
    window.max(0.5 * overall).min(1.0)
}

fn window_penalty(keys: &[String]) -> f64 {
    let size = REDUNDANCY_WINDOW.min(keys.len());
    let mut total = 0usize;

    for window in keys.windows(size) {
        total += excess_repeats(window, WINDOW_REPEAT_THRESHOLD);
    }

    (total as f64 / keys.len() as f64).min(1.0)
}

fn overall_penalty(keys: &[String]) -> f64 {
    let total = excess_repeats(keys, OVERALL_REPEAT_THRESHOLD);
    (total as f64 / keys.len() as f64).min(1.0)
}

/// Sum of `count - (threshold - 1)` over keys seen at least `threshold` times.
fn excess_repeats(keys: &[String], threshold: usize) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    counts
        .values()
        .filter(|&&count| count >= threshold)
        .map(|&count| count - (threshold - 1))
        .sum()
}
