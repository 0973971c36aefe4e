//! Width (parameter) scaling grid driver.
//!
//! Cartesian grid of hidden widths × seeds, one positional index per grid
//! point, staggered start like the data-budget driver.
//!
//! Usage: width-scaling <TASK_IDX> [--results-dir DIR]

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parity_mix::train::{run, RunConfig};

const STAGGER_SECS: u64 = 5;
const WIDTHS: [usize; 8] = [10, 20, 50, 100, 200, 500, 1_000, 2_000];
const SEEDS: [u64; 3] = [0, 1, 2];

/// Cartesian (width, seed) enumeration, width-major.
fn grid() -> Vec<(usize, u64)> {
    let mut points = Vec::with_capacity(WIDTHS.len() * SEEDS.len());
    for &width in &WIDTHS {
        for &seed in &SEEDS {
            points.push((width, seed));
        }
    }
    points
}

#[derive(Parser, Debug)]
#[command(name = "width-scaling")]
#[command(about = "Run one point of the width scaling grid")]
struct Cli {
    /// Index into the (width, seed) grid
    task_idx: usize,

    /// Directory for run record JSON files
    #[arg(long, default_value = "results/width-scaling")]
    results_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let points = grid();
    if cli.task_idx >= points.len() {
        bail!("task index {} out of range (grid has {} points)", cli.task_idx, points.len());
    }

    thread::sleep(Duration::from_secs(cli.task_idx as u64 * STAGGER_SECS));

    let (width, seed) = points[cli.task_idx];
    let config = RunConfig {
        width,
        seed,
        ..RunConfig::default()
    };

    tracing::info!(task_idx = cli.task_idx, width, seed, "grid point");
    let record = run(&config)?;

    fs::create_dir_all(&cli.results_dir)
        .with_context(|| format!("creating {}", cli.results_dir.display()))?;
    let path = cli
        .results_dir
        .join(format!("width-{}-seed-{}.json", width, seed));
    fs::write(&path, serde_json::to_string(&record)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "run record written");

    Ok(())
}
