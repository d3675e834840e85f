use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};
use trajeval_lib::{
    config::env, report::format_ratio, Evaluation, EvaluationError, GoldenPathRegistry,
    ScoringConfig,
};

pub mod renderer;

const DEFAULT_LOG_FILTER: &str = "info,trajeval_lib=info,trajeval_runner=info";

/// Installs the global subscriber. Logs go to stderr so stdout only
/// carries reports; `RUST_LOG` overrides the default filter.
pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default tracing subscriber")
}

/// Picks the golden path source: the explicit file, then
/// `TRAJEVAL_GOLDEN_PATHS`, then the built-in table.
pub fn load_registry(golden_paths: Option<&Path>) -> Result<GoldenPathRegistry> {
    let source: Option<PathBuf> = golden_paths
        .map(Path::to_path_buf)
        .or_else(env::golden_paths_path);

    match source {
        Some(path) => GoldenPathRegistry::from_yaml_file(&path)
            .with_context(|| format!("Failed to load golden paths from {}", path.display())),
        None => {
            debug!("Using built-in golden paths");
            Ok(GoldenPathRegistry::builtin())
        }
    }
}

/// Builds the scoring configuration. A config file (flag, then
/// `TRAJEVAL_SCORING_CONFIG`) replaces the defaults; an explicit
/// `min_similarity` wins over both the file and the environment.
pub fn load_scoring_config(
    config_path: Option<&Path>,
    min_similarity: Option<f64>,
) -> Result<ScoringConfig> {
    let source: Option<PathBuf> = config_path
        .map(Path::to_path_buf)
        .or_else(env::scoring_config_path);

    let config = match source {
        Some(path) => {
            let config = ScoringConfig::from_yaml_file(&path).with_context(|| {
                format!("Failed to load scoring config from {}", path.display())
            })?;
            info!(path = %path.display(), "Loaded scoring config");
            config
        }
        None => ScoringConfig::from_env(),
    };

    let config = match min_similarity {
        Some(threshold) => config.with_min_similarity(threshold),
        None => config,
    };
    config.validate().context("Invalid scoring configuration")?;
    Ok(config)
}

/// One task name per line, sorted.
pub fn format_task_list(registry: &GoldenPathRegistry) -> String {
    let mut lines = vec![format!("Available tasks ({}):", registry.len())];
    for name in registry.task_names() {
        let steps = registry.get(name).map(|p| p.len()).unwrap_or(0);
        lines.push(format!("  - {name} ({steps} steps)"));
    }
    lines.join("\n")
}

/// Short score block printed after a single-file evaluation.
pub fn format_score_summary(evaluation: &Evaluation) -> String {
    let scores = &evaluation.scores;
    [
        format!("Task: {}", evaluation.task_name),
        format!("Efficiency Score: {:.2}/100", scores.efficiency_score),
        format!("  Coverage: {:.3}", scores.coverage),
        format!("  Order Score: {:.3}", scores.order_score),
        format!("  Length Efficiency: {:.3}", scores.length_efficiency),
        format!("  Redundancy Penalty: {:.3}", scores.redundancy_penalty),
        format!(
            "  Path Length Ratio: {}",
            format_ratio(scores.path_length_ratio)
        ),
        format!(
            "  Matched Steps: {}/{}",
            scores.matched_steps, scores.golden_path_length
        ),
    ]
    .join("\n")
}

/// Error block printed for a failed evaluation.
pub fn format_failure(error: &EvaluationError) -> String {
    let mut lines = vec![
        format!("Task: {}", error.task_name),
        format!("Error ({}): {}", error.kind.as_str(), error.error),
    ];
    if let Some(agent_path) = &error.agent_path {
        lines.push(format!("Parsed agent actions: {}", agent_path.len()));
    }
    lines.join("\n")
}

/// Serializes `value` as pretty JSON into `path`.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trajeval_lib::Evaluator;

    #[test]
    fn test_task_list_is_sorted() {
        let registry = GoldenPathRegistry::builtin();
        let listing = format_task_list(&registry);
        let mut lines = listing.lines();
        assert_eq!(lines.next(), Some("Available tasks (10):"));
        assert_eq!(
            lines.next(),
            Some("  - ds-janusgraph-exercise (6 steps)")
        );
    }

    #[test]
    fn test_score_summary() {
        let registry = GoldenPathRegistry::builtin();
        let evaluator = Evaluator::new(&registry, ScoringConfig::default());
        let golden = vec!["finish()".to_string()];
        let evaluation = evaluator.evaluate_paths("demo", golden.clone(), golden);

        let summary = format_score_summary(&evaluation);
        assert!(summary.starts_with("Task: demo\nEfficiency Score: 100.00/100"));
        assert!(summary.contains("  Path Length Ratio: 1.00x"));
        assert!(summary.ends_with("  Matched Steps: 1/1"));
    }
}
