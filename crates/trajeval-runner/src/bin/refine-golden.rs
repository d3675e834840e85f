//! # Golden Path Refiner
//!
//! Aligns a hand-written golden path against a real trajectory and prints a
//! suggested refined path built from the agent's concrete actions.
//!
//! Usage:
//! ```bash
//! refine-golden --task pm-schedule-meeting-1 \
//!     --trajectory trajectories/traj_pm-schedule-meeting-1-image.json
//!
//! # Save the suggestion and show every parsed action
//! refine-golden --task sde-run-janusgraph --trajectory traj.json \
//!     --save-json refined.json --print-parsed
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::info;
use trajeval_lib::{
    config::env, parser::parse_trajectory_file, refine::load_description_file,
    refine_golden_path,
};
use trajeval_runner::{
    init_tracing, load_registry, renderer::render_refinement_as_tree, write_json,
};

#[derive(Parser, Debug)]
#[command(
    name = "refine-golden",
    about = "Suggest a refined golden path from a real trajectory"
)]
struct Args {
    /// Task whose golden path is refined
    #[arg(long)]
    task: String,

    /// Trajectory JSON file to align against
    #[arg(long)]
    trajectory: PathBuf,

    /// Markdown file of canonical golden paths
    #[arg(long, default_value = "golden_paths_descriptions.md")]
    descriptions: PathBuf,

    /// Minimum similarity for a canonical step to count as matched
    #[arg(long)]
    min_similarity: Option<f64>,

    /// Write the refinement as JSON to this file
    #[arg(long)]
    save_json: Option<PathBuf>,

    /// Print every action parsed from the trajectory
    #[arg(long)]
    print_parsed: bool,
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    init_tracing()?;

    let min_similarity = args.min_similarity.unwrap_or_else(env::min_similarity);
    if !(0.0..=1.0).contains(&min_similarity) {
        bail!("--min-similarity must be within [0, 1], got {min_similarity}");
    }

    let parsed = parse_trajectory_file(&args.trajectory).with_context(|| {
        format!("Failed to parse trajectory {}", args.trajectory.display())
    })?;
    info!(actions = parsed.len(), "Parsed trajectory");

    if args.print_parsed {
        println!("Parsed actions ({}):", parsed.len());
        for (i, action) in parsed.iter().enumerate() {
            println!("  {}. {action}", i + 1);
        }
        println!();
    }

    let descriptions = load_description_file(&args.descriptions).with_context(|| {
        format!(
            "Failed to read descriptions file {}",
            args.descriptions.display()
        )
    })?;
    let registry = load_registry(None)?;
    let canonical = match descriptions.get(&args.task) {
        Some(actions) => actions.clone(),
        None => match registry.get(&args.task) {
            Some(actions) => actions.to_vec(),
            None => bail!(
                "No canonical golden path for task '{}' in {} or the golden path registry",
                args.task,
                args.descriptions.display()
            ),
        },
    };

    let refinement = refine_golden_path(&args.task, &parsed, &canonical, min_similarity);

    println!("{}", render_refinement_as_tree(&refinement)?);
    println!("Suggested golden path:");
    for (i, action) in refinement.suggested_golden_path.iter().enumerate() {
        println!("  {}. {action}", i + 1);
    }

    if let Some(path) = &args.save_json {
        write_json(&refinement, path)?;
    }

    Ok(())
}
