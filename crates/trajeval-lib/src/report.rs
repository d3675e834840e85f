//! Plain-text diagnostic report.

use crate::score::ScoreResult;

const RULE_WIDTH: usize = 60;

/// Renders a human-readable report for one scored trajectory.
pub fn generate_diagnostic_report(
    agent_path: &[String],
    golden_path: &[String],
    scores: &ScoreResult,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(rule.clone());
    lines.push("EFFICIENCY EVALUATION REPORT".to_string());
    lines.push(rule.clone());
    lines.push(String::new());

    lines.push(format!(
        "Overall Efficiency Score: {:.2}/100",
        scores.efficiency_score
    ));
    lines.push(String::new());

    lines.push("Component Scores:".to_string());
    lines.push(format!("  Coverage: {:.3} (0-1)", scores.coverage));
    lines.push(format!("  Order Score: {:.3} (0-1)", scores.order_score));
    lines.push(format!(
        "  Length Efficiency: {:.3} (0-1)",
        scores.length_efficiency
    ));
    lines.push(format!(
        "  Redundancy Penalty: {:.3} (0-1)",
        scores.redundancy_penalty
    ));
    lines.push(format!(
        "  Completeness Bonus: {:.1}",
        scores.completeness_bonus
    ));
    lines.push(format!(
        "  Path Length Ratio: {}",
        format_ratio(scores.path_length_ratio)
    ));
    lines.push(String::new());

    lines.push("Path Comparison:".to_string());
    lines.push(format!(
        "  Golden Path Length: {} actions",
        scores.golden_path_length
    ));
    lines.push(format!(
        "  Agent Path Length: {} actions",
        scores.agent_path_length
    ));
    lines.push(format!(
        "  Matched Golden Steps: {}/{}",
        scores.matched_steps, scores.golden_path_length
    ));
    lines.push(String::new());

    lines.push("Golden Path Actions:".to_string());
    push_enumerated(&mut lines, golden_path);
    lines.push(String::new());

    lines.push("Agent Path Actions:".to_string());
    push_enumerated(&mut lines, agent_path);
    lines.push(String::new());

    lines.push("Summary of results:".to_string());
    for finding in summary_findings(scores) {
        lines.push(format!("  - {finding}"));
    }

    lines.push(rule);
    lines.join("\n")
}

/// Formats a path length ratio as `1.40x`, or `n/a` when undefined.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.2}x"),
        None => "n/a".to_string(),
    }
}

fn push_enumerated(lines: &mut Vec<String>, actions: &[String]) {
    if actions.is_empty() {
        lines.push("  (none)".to_string());
        return;
    }
    for (i, action) in actions.iter().enumerate() {
        lines.push(format!("  {}. {action}", i + 1));
    }
}

/// Qualitative findings driven by fixed thresholds.
pub fn summary_findings(scores: &ScoreResult) -> Vec<&'static str> {
    let mut findings = Vec::new();

    if scores.coverage < 0.5 {
        findings.push("Agent missed most of the golden path steps");
    } else if scores.coverage < 0.8 {
        findings.push("Agent missed several golden path steps");
    } else {
        findings.push("Agent covered the golden path");
    }

    if scores.redundancy_penalty > 0.3 {
        findings.push("High redundancy");
    }

    if let Some(ratio) = scores.path_length_ratio {
        if ratio > 2.0 {
            findings.push("Agent path is much longer than optimal");
        } else if ratio > 1.5 {
            findings.push("Agent path is significantly longer than optimal");
        } else if ratio < 0.7 {
            findings.push("Agent path is shorter than expected");
        }
    }

    findings
}
