use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use trajeval_lib::{EvaluationRecord, Evaluator};
use trajeval_runner::{
    format_failure, format_score_summary, format_task_list, init_tracing, load_registry,
    load_scoring_config, renderer::render_batch_as_tree, write_json,
};

/// Scores agent trajectories against golden paths.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Trajectory JSON file or a directory of `traj_*.json` files.
    path: Option<PathBuf>,

    /// Task name to use instead of the one derived from the file name.
    #[arg(short, long)]
    task_name: Option<String>,

    /// Write results as JSON to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full diagnostic report for a single trajectory.
    #[arg(short, long)]
    report: bool,

    /// List the tasks that have golden paths and exit.
    #[arg(long)]
    list_tasks: bool,

    /// YAML file of golden paths replacing the built-in table.
    #[arg(long)]
    golden_paths: Option<PathBuf>,

    /// YAML scoring configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum similarity for a golden step to count as matched.
    #[arg(long)]
    min_similarity: Option<f64>,
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Warning: {e:#}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let registry = load_registry(cli.golden_paths.as_deref())?;

    if cli.list_tasks {
        println!("{}", format_task_list(&registry));
        return Ok(ExitCode::SUCCESS);
    }

    let Some(path) = cli.path else {
        eprintln!("Error: a trajectory file or directory is required (or use --list-tasks)");
        return Ok(ExitCode::FAILURE);
    };
    if !path.exists() {
        eprintln!("Error: path does not exist: {}", path.display());
        return Ok(ExitCode::FAILURE);
    }

    let config = load_scoring_config(cli.config.as_deref(), cli.min_similarity)?;
    let evaluator = Evaluator::new(&registry, config);

    if path.is_file() {
        let record = evaluator.evaluate_trajectory(&path, cli.task_name.as_deref());
        if let Some(output) = &cli.output {
            write_json(&record, output)?;
        }

        match &record {
            EvaluationRecord::Scored(evaluation) => {
                println!("{}", format_score_summary(evaluation));
                if cli.report {
                    println!("\n{}", evaluation.diagnostic_report);
                }
                Ok(ExitCode::SUCCESS)
            }
            EvaluationRecord::Failed(error) => {
                eprintln!("{}", format_failure(error));
                Ok(ExitCode::FAILURE)
            }
        }
    } else if path.is_dir() {
        if cli.task_name.is_some() {
            warn!("--task-name is ignored when evaluating a directory");
        }
        info!(dir = %path.display(), "Evaluating trajectory directory");

        let batch = evaluator.evaluate_directory(&path);
        let tree = render_batch_as_tree(&batch).context("Failed to render batch summary")?;
        println!("{tree}");

        if let Some(output) = &cli.output {
            write_json(&batch, output)?;
        }
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "Error: path is neither a file nor a directory: {}",
            path.display()
        );
        Ok(ExitCode::FAILURE)
    }
}
