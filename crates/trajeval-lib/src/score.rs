//! Efficiency score.
//!
//! Combines the four path metrics into a 0-100 score:
//!
//! 1. Coverage and order earn `100 * weight * metric` points.
//! 2. Length and redundancy start at their full weight and lose points for
//!    inefficiency. Redundancy is halved for near-complete paths; a fully
//!    covered path instead has its combined length and redundancy loss
//!    capped at [`FULL_COVERAGE_LOSS_CAP`] points.
//! 3. A complete, ordered path earns [`COMPLETENESS_BONUS`] extra points.
//! 4. The total is clamped to `[0, 100]`.

use crate::align::{align_actions, Alignment};
use crate::config::ScoringConfig;
use crate::metrics::{
    coverage, length_efficiency, order_score, path_length_ratio, redundancy_penalty,
    HIGH_COVERAGE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most points a fully covered path can lose to length and redundancy.
pub const FULL_COVERAGE_LOSS_CAP: f64 = 15.0;
/// Points added for a complete path taken in golden order.
pub const COMPLETENESS_BONUS: f64 = 10.0;
/// Order score needed for the completeness bonus.
pub const BONUS_ORDER_THRESHOLD: f64 = 0.9;

/// Scores for one agent path against one golden path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Overall score, 0-100.
    pub efficiency_score: f64,
    /// Fraction of golden steps matched.
    pub coverage: f64,
    /// Legacy name for `coverage`, kept for consumers of older result files.
    pub path_similarity: f64,
    pub order_score: f64,
    pub length_efficiency: f64,
    /// Redundancy after coverage dampening.
    pub redundancy_penalty: f64,
    /// `None` when the golden path is empty and the agent path is not.
    pub path_length_ratio: Option<f64>,
    pub completeness_bonus: f64,
    pub matched_steps: usize,
    pub agent_path_length: usize,
    pub golden_path_length: usize,
}

/// Scores `agent` against `golden`.
pub fn calculate_efficiency_score(
    agent: &[String],
    golden: &[String],
    config: &ScoringConfig,
) -> ScoreResult {
    let alignment = align_actions(golden, agent, config.min_similarity);
    score_alignment(&alignment, agent, golden.len(), config)
}

/// Scores an alignment that was already computed for `agent`.
pub fn score_alignment(
    alignment: &Alignment,
    agent: &[String],
    golden_len: usize,
    config: &ScoringConfig,
) -> ScoreResult {
    let agent_len = agent.len();
    let ratio = path_length_ratio(agent_len, golden_len);

    if golden_len == 0 {
        // Nothing to do: doing nothing is perfect, doing anything is not.
        let score = if agent_len == 0 { 100.0 } else { 0.0 };
        return ScoreResult {
            efficiency_score: score,
            coverage: 1.0,
            path_similarity: 1.0,
            order_score: 1.0,
            length_efficiency: length_efficiency(agent_len, 0, 1.0),
            redundancy_penalty: redundancy_penalty(agent),
            path_length_ratio: ratio,
            completeness_bonus: 0.0,
            matched_steps: 0,
            agent_path_length: agent_len,
            golden_path_length: 0,
        };
    }

    let cov = coverage(alignment);
    let order = order_score(alignment);
    let length_eff = length_efficiency(agent_len, golden_len, cov);
    let full_coverage = cov >= 1.0;

    let mut redundancy = redundancy_penalty(agent);
    if !full_coverage && cov >= HIGH_COVERAGE {
        redundancy /= 2.0;
    }

    let weights = &config.weights;
    let mut length_loss = 100.0 * weights.length * (1.0 - length_eff);
    let mut redundancy_loss = 100.0 * weights.redundancy * redundancy;
    if full_coverage {
        let total_loss = length_loss + redundancy_loss;
        if total_loss > FULL_COVERAGE_LOSS_CAP {
            let scale = FULL_COVERAGE_LOSS_CAP / total_loss;
            length_loss *= scale;
            redundancy_loss *= scale;
        }
    }

    let bonus = if full_coverage && order >= BONUS_ORDER_THRESHOLD {
        COMPLETENESS_BONUS
    } else {
        0.0
    };

    let efficiency_score = if agent_len == 0 {
        0.0
    } else {
        let raw = 100.0 * weights.coverage * cov
            + 100.0 * weights.order * order
            + (100.0 * weights.length - length_loss)
            + (100.0 * weights.redundancy - redundancy_loss)
            + bonus;
        clamp_score(raw)
    };

    debug!(
        coverage = cov,
        order,
        length_eff,
        redundancy,
        length_loss,
        redundancy_loss,
        bonus,
        efficiency_score,
        "scored path"
    );

    ScoreResult {
        efficiency_score,
        coverage: cov,
        path_similarity: cov,
        order_score: order,
        length_efficiency: length_eff,
        redundancy_penalty: redundancy,
        path_length_ratio: ratio,
        completeness_bonus: bonus,
        matched_steps: alignment.matched_count(),
        agent_path_length: agent_len,
        golden_path_length: golden_len,
    }
}

/// Clamps to `[0, 100]`; NaN maps to 0.
fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
