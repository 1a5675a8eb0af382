//! benchplot - render runtime and memory comparison charts from a benchmark table.
//!
//! Reads one CSV row per measured input size `n` and writes four SVG charts
//! comparing brute force, state-compression DP, interval DP and Blossom.

mod dataset;
mod error;
mod plot;
mod report;
mod series;
mod style;

use anyhow::{Context, Result};
use clap::Parser;
use dataset::{Dataset, DEFAULT_DATASET};
use env_logger::Env;
use log::info;
use report::DatasetSummary;
use std::path::{Path, PathBuf};

/// Benchmark chart renderer for matching algorithm comparisons
#[derive(Parser, Debug)]
#[command(name = "benchplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Benchmark CSV to plot
    #[arg(value_name = "INPUT", default_value = DEFAULT_DATASET)]
    input: PathBuf,
}

/// Load the table, log its coverage and render every chart into `output_dir`
fn run(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    info!("Loading benchmark table from {}", input.display());
    let dataset = Dataset::load(input)
        .with_context(|| format!("Failed to load dataset {}", input.display()))?;

    DatasetSummary::from_dataset(&dataset).log();

    plot::generate_plots(&dataset, output_dir)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let generated = run(&args.input, Path::new("."))?;

    eprintln!("\nGenerated {} plots:", generated.len());
    for path in &generated {
        eprintln!("  • {}", path.display());
    }
    println!("All charts generated.");
    Ok(())
}
