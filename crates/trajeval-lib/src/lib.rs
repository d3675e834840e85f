//! Trajeval Library
//!
//! Scores how efficiently an agent trajectory follows a golden path:
//! - Normalization of action strings into comparable keys
//! - Fuzzy action similarity and greedy golden-path alignment
//! - Coverage, order, length and redundancy metrics
//! - A weighted 0-100 efficiency score and a plain-text diagnostic report
//! - Trajectory log parsing, golden path registries and batch evaluation

pub mod action;
pub mod align;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod golden;
pub mod metrics;
pub mod normalize;
pub mod parser;
pub mod refine;
pub mod report;
pub mod score;
pub mod similarity;

// Re-export main types for convenience
pub use align::{align_actions, Alignment, AlignmentEntry, DEFAULT_MIN_SIMILARITY};
pub use config::{ScoreWeights, ScoringConfig};
pub use error::{ConfigError, GoldenPathError, ParseError, ParseResult};
pub use evaluator::{
    BatchResults, ErrorKind, Evaluation, EvaluationError, EvaluationRecord, Evaluator,
};
pub use golden::GoldenPathRegistry;
pub use normalize::{normalize_action, normalize_path};
pub use parser::parse_trajectory_file;
pub use refine::{refine_golden_path, Refinement};
pub use report::generate_diagnostic_report;
pub use score::{calculate_efficiency_score, ScoreResult};
pub use similarity::action_similarity;
