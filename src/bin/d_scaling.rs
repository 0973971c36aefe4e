//! Data-budget scaling grid driver.
//!
//! Enumerates a log-spaced grid of data budgets D, takes one grid index as a
//! positional argument, and executes that single grid point in-process. The
//! start is staggered by `index * 5s` so a batch of workers launched together
//! does not hit the filesystem at once — a convention, not a correctness
//! requirement.
//!
//! Usage: d-scaling <TASK_IDX> [--results-dir DIR]

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parity_mix::train::{run, RunConfig};

const STAGGER_SECS: u64 = 5;

/// Log-spaced data budgets: 2^linspace(log2(1e5), log2(1e7), 20).
fn data_budget_grid() -> Vec<usize> {
    let points = 20;
    let lo = (1e5f64).log2();
    let hi = (1e7f64).log2();
    (0..points)
        .map(|i| {
            let e = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            e.exp2().round() as usize
        })
        .collect()
}

#[derive(Parser, Debug)]
#[command(name = "d-scaling")]
#[command(about = "Run one point of the data-budget scaling grid")]
struct Cli {
    /// Index into the data budget grid
    task_idx: usize,

    /// Directory for run record JSON files
    #[arg(long, default_value = "results/d-scaling")]
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
    let grid = data_budget_grid();
    if cli.task_idx >= grid.len() {
        bail!("task index {} out of range (grid has {} points)", cli.task_idx, grid.len());
    }

    thread::sleep(Duration::from_secs(cli.task_idx as u64 * STAGGER_SECS));

    let d = grid[cli.task_idx];
    let batch_size = 15_000;
    let config = RunConfig {
        n_tasks: 500,
        n: 100,
        k: 3,
        alpha: 1.4,
        width: 1_000,
        depth: 2,
        activation: "ReLU".to_string(),
        steps: d.div_ceil(batch_size),
        batch_size,
        lr: 1e-3,
        test_points: 60_000,
        test_points_per_task: 1_000,
        log_freq: 50,
        seed: 0,
    };

    tracing::info!(task_idx = cli.task_idx, d, steps = config.steps, "grid point");
    let record = run(&config)?;

    fs::create_dir_all(&cli.results_dir)
        .with_context(|| format!("creating {}", cli.results_dir.display()))?;
    let path = cli.results_dir.join(format!("D-{:02}-{}.json", cli.task_idx, d));
    fs::write(&path, serde_json::to_string(&record)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "run record written");

    Ok(())
}
