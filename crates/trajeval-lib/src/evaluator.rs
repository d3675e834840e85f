//! Evaluation boundary.
//!
//! Ties the parser, the golden path registry, the scorer and the report
//! generator together for one trajectory file or a directory of them.
//! Nothing here returns `Err`: every failure becomes an
//! [`EvaluationRecord::Failed`] so a batch never stops on a bad file.

use crate::config::ScoringConfig;
use crate::error::ParseError;
use crate::golden::GoldenPathRegistry;
use crate::parser::parse_trajectory_file;
use crate::report::generate_diagnostic_report;
use crate::score::{calculate_efficiency_score, ScoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

const TRAJECTORY_PREFIX: &str = "traj_";

/// Why a trajectory could not be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The trajectory file does not exist.
    MissingInput,
    /// The trajectory exists but could not be read or parsed.
    ParseFailure,
    /// No golden path is registered for the task.
    UnknownTask,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "missing_input",
            ErrorKind::ParseFailure => "parse_failure",
            ErrorKind::UnknownTask => "unknown_task",
        }
    }
}

/// A failed evaluation. For [`ErrorKind::UnknownTask`] the parsed agent
/// path is kept so it can still be inspected.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{error}")]
pub struct EvaluationError {
    pub kind: ErrorKind,
    pub task_name: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_path: Option<Vec<String>>,
    pub evaluated_at: DateTime<Utc>,
}

/// A successfully scored trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_path: Option<String>,
    pub scores: ScoreResult,
    pub agent_path: Vec<String>,
    pub golden_path: Vec<String>,
    pub diagnostic_report: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Outcome of evaluating one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationRecord {
    Scored(Evaluation),
    Failed(EvaluationError),
}

impl EvaluationRecord {
    pub fn task_name(&self) -> &str {
        match self {
            EvaluationRecord::Scored(evaluation) => &evaluation.task_name,
            EvaluationRecord::Failed(error) => &error.task_name,
        }
    }

    pub fn scores(&self) -> Option<&ScoreResult> {
        match self {
            EvaluationRecord::Scored(evaluation) => Some(&evaluation.scores),
            EvaluationRecord::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&EvaluationError> {
        match self {
            EvaluationRecord::Scored(_) => None,
            EvaluationRecord::Failed(error) => Some(error),
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, EvaluationRecord::Scored(_))
    }
}

/// Results of a directory evaluation, keyed by task name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResults {
    pub results: BTreeMap<String, EvaluationRecord>,
}

impl BatchResults {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, task_name: &str) -> Option<&EvaluationRecord> {
        self.results.get(task_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EvaluationRecord)> {
        self.results.iter()
    }

    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_scored()).count()
    }

    /// Mean efficiency score over the scored records.
    pub fn mean_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .results
            .values()
            .filter_map(|r| r.scores().map(|s| s.efficiency_score))
            .collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    /// Writes the whole mapping as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

/// Derives a task name from a trajectory file name:
/// `traj_pm-schedule-meeting-1-image.json` → `pm-schedule-meeting-1`.
pub fn task_name_from_filename(file_name: &str) -> String {
    file_name
        .replace(TRAJECTORY_PREFIX, "")
        .replace("-image.json", "")
        .replace(".json", "")
}

fn task_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    task_name_from_filename(&file_name)
}

/// Lists `traj_*.json` files directly inside `dir`, sorted by file name.
pub fn discover_trajectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| {
            entry.ok().and_then(|e| {
                let path = e.path();
                let name = path.file_name()?.to_str()?;
                if path.is_file() && name.starts_with(TRAJECTORY_PREFIX) && name.ends_with(".json")
                {
                    Some(path)
                } else {
                    None
                }
            })
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Scores trajectories against an injected golden path registry.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    registry: &'a GoldenPathRegistry,
    config: ScoringConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a GoldenPathRegistry, config: ScoringConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &GoldenPathRegistry {
        self.registry
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores an agent path against a golden path and renders the report.
    pub fn evaluate_paths(
        &self,
        task_name: &str,
        agent_path: Vec<String>,
        golden_path: Vec<String>,
    ) -> Evaluation {
        let scores = calculate_efficiency_score(&agent_path, &golden_path, &self.config);
        let diagnostic_report = generate_diagnostic_report(&agent_path, &golden_path, &scores);
        Evaluation {
            task_name: task_name.to_string(),
            trajectory_path: None,
            scores,
            agent_path,
            golden_path,
            diagnostic_report,
            evaluated_at: Utc::now(),
        }
    }

    /// Evaluates an agent path that was already parsed. A task whose golden
    /// path is empty has nothing to score against and fails as unknown.
    pub fn evaluate_agent_path(&self, task_name: &str, agent_path: Vec<String>) -> EvaluationRecord {
        match self.registry.get(task_name) {
            Some(golden) if !golden.is_empty() => {
                EvaluationRecord::Scored(self.evaluate_paths(task_name, agent_path, golden.to_vec()))
            }
            Some(_) | None => EvaluationRecord::Failed(EvaluationError {
                kind: ErrorKind::UnknownTask,
                task_name: task_name.to_string(),
                error: format!("No golden path found for task: {task_name}"),
                trajectory_path: None,
                agent_path: Some(agent_path),
                evaluated_at: Utc::now(),
            }),
        }
    }

    /// Evaluates one trajectory file. The task name comes from
    /// `task_override` or else from the file name.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn evaluate_trajectory(&self, path: &Path, task_override: Option<&str>) -> EvaluationRecord {
        let task_name = task_override
            .map(str::to_string)
            .unwrap_or_else(|| task_name_from_path(path));
        let trajectory_path = path.display().to_string();

        let failure = |kind: ErrorKind, error: String| {
            warn!(task = %task_name, kind = kind.as_str(), %error, "Evaluation failed");
            EvaluationRecord::Failed(EvaluationError {
                kind,
                task_name: task_name.clone(),
                error,
                trajectory_path: Some(trajectory_path.clone()),
                agent_path: None,
                evaluated_at: Utc::now(),
            })
        };

        let agent_path = match parse_trajectory_file(path) {
            Ok(actions) => actions,
            Err(ParseError::NotFound(_)) => {
                return failure(
                    ErrorKind::MissingInput,
                    format!("Trajectory file not found: {trajectory_path}"),
                );
            }
            Err(e) => {
                return failure(
                    ErrorKind::ParseFailure,
                    format!("Error parsing trajectory: {e}"),
                );
            }
        };

        match self.evaluate_agent_path(&task_name, agent_path) {
            EvaluationRecord::Scored(mut evaluation) => {
                info!(
                    task = %task_name,
                    score = evaluation.scores.efficiency_score,
                    "Trajectory scored"
                );
                evaluation.trajectory_path = Some(trajectory_path);
                EvaluationRecord::Scored(evaluation)
            }
            EvaluationRecord::Failed(mut error) => {
                warn!(task = %task_name, kind = error.kind.as_str(), "Evaluation failed");
                error.trajectory_path = Some(trajectory_path);
                EvaluationRecord::Failed(error)
            }
        }
    }

    /// Evaluates every `traj_*.json` file in `dir`. Failures are recorded
    /// per file and never stop the batch.
    pub fn evaluate_directory(&self, dir: &Path) -> BatchResults {
        let mut batch = BatchResults::default();

        let paths = match discover_trajectories(dir) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not read trajectory directory");
                return batch;
            }
        };
        if paths.is_empty() {
            warn!(dir = %dir.display(), "No trajectory files found");
            return batch;
        }

        for path in paths {
            info!(file = %path.display(), "Evaluating trajectory");
            let record = self.evaluate_trajectory(&path, None);
            let task_name = record.task_name().to_string();
            if batch.results.contains_key(&task_name) {
                warn!(task = %task_name, file = %path.display(), "Replacing earlier result for task");
            }
            batch.results.insert(task_name, record);
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_name_from_filename() {
        assert_eq!(
            task_name_from_filename("traj_pm-schedule-meeting-1-image.json"),
            "pm-schedule-meeting-1"
        );
        assert_eq!(
            task_name_from_filename("traj_sde-run-janusgraph.json"),
            "sde-run-janusgraph"
        );
        assert_eq!(task_name_from_filename("custom"), "custom");
    }

    #[test]
    fn test_unknown_task_keeps_agent_path() {
        let registry = GoldenPathRegistry::builtin();
        let evaluator = Evaluator::new(&registry, ScoringConfig::default());
        let agent = vec!["finish()".to_string()];

        let record = evaluator.evaluate_agent_path("does-not-exist", agent.clone());
        let error = record.error().expect("unknown task must fail");
        assert_eq!(error.kind, ErrorKind::UnknownTask);
        assert_eq!(error.agent_path.as_ref(), Some(&agent));
        assert!(record.scores().is_none());
    }

    #[test]
    fn test_empty_golden_path_is_unknown_task() {
        let registry: GoldenPathRegistry = [
            ("empty-task".to_string(), Vec::new()),
            ("finish-only".to_string(), vec!["finish()".to_string()]),
        ]
        .into_iter()
        .collect();
        let evaluator = Evaluator::new(&registry, ScoringConfig::default());
        let agent = vec!["execute_bash(command='ls')".to_string(), "finish()".to_string()];

        let record = evaluator.evaluate_agent_path("empty-task", agent.clone());
        let error = record.error().expect("empty golden path must fail");
        assert_eq!(error.kind, ErrorKind::UnknownTask);
        assert_eq!(error.agent_path.as_ref(), Some(&agent));
        assert!(record.scores().is_none());

        assert!(evaluator.evaluate_agent_path("finish-only", agent).scores().is_some());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ParseFailure).unwrap();
        assert_eq!(json, "\"parse_failure\"");
    }
}
