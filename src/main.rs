//! Core training entry point.
//!
//! Runs one multi-task sparse parity experiment from named CLI options and
//! persists the run record (parameter count, examples seen, subtask set, and
//! all metric series) as JSON.
//!
//! Examples:
//!   parity-mix --n-tasks 100 --n 50 --k 3 --alpha 1.5 --steps 25000
//!   parity-mix --width 1000 --seed 3 --out results/width-1000-seed-3.json

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parity_mix::train::{run, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "parity-mix")]
#[command(version)]
#[command(about = "Train an MLP on a Zipfian mixture of sparse parity subtasks")]
struct Cli {
    /// Number of parity subtasks in the mixture
    #[arg(long, default_value_t = 100)]
    n_tasks: usize,

    /// Bit string length
    #[arg(long, default_value_t = 50)]
    n: usize,

    /// Bits per parity (must satisfy k <= n)
    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Zipfian skew over task ranks (must be > 1)
    #[arg(long, default_value_t = 1.5)]
    alpha: f64,

    /// Hidden layer width
    #[arg(long, default_value_t = 100)]
    width: usize,

    /// Number of affine layers (>= 1)
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Nonlinearity: ReLU, Tanh or Sigmoid
    #[arg(long, default_value = "ReLU")]
    activation: String,

    /// Total training steps
    #[arg(long, default_value_t = 25_000)]
    steps: usize,

    /// Examples per training batch
    #[arg(long, default_value_t = 10_000)]
    batch_size: usize,

    /// Adam step size
    #[arg(long, default_value_t = 1e-3)]
    lr: f32,

    /// Aggregate evaluation batch size
    #[arg(long, default_value_t = 30_000)]
    test_points: usize,

    /// Per-subtask probe batch size
    #[arg(long, default_value_t = 1_000)]
    test_points_per_task: usize,

    /// Evaluation period in steps
    #[arg(long, default_value_t = 25)]
    log_freq: usize,

    /// RNG seed for the whole run
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Where to write the JSON run record
    #[arg(long, default_value = "results/run.json")]
    out: PathBuf,
}

impl Cli {
    fn into_config(self) -> (RunConfig, PathBuf) {
        let config = RunConfig {
            n_tasks: self.n_tasks,
            n: self.n,
            k: self.k,
            alpha: self.alpha,
            width: self.width,
            depth: self.depth,
            activation: self.activation,
            steps: self.steps,
            batch_size: self.batch_size,
            lr: self.lr,
            test_points: self.test_points,
            test_points_per_task: self.test_points_per_task,
            log_freq: self.log_freq,
            seed: self.seed,
        };
        (config, self.out)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, out) = Cli::parse().into_config();

    let record = run(&config)?;
    tracing::info!(
        param_count = record.param_count,
        examples_seen = record.examples_seen,
        evaluations = record.metrics.len(),
        "run finished"
    );

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating results directory {}", parent.display()))?;
    }
    let json = serde_json::to_string(&record).context("serializing run record")?;
    fs::write(&out, json).with_context(|| format!("writing run record to {}", out.display()))?;
    tracing::info!(path = %out.display(), "run record written");

    Ok(())
}
