//! Run configuration, validation, and the training step loop.
//!
//! A run is strictly sequential on one thread: sample a batch composition,
//! synthesize the batch, forward, cross-entropy, backward, one Adam step —
//! with the evaluation pass interleaved every `log_freq` steps (including
//! step 0). No checkpointing and no retries: a run finishes or dies, and the
//! metrics store in the returned record is the only durable artifact.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adam::{Adam, AdamConfig};
use crate::batch::synthesize_batch;
use crate::eval::evaluate;
use crate::metrics::MetricsStore;
use crate::mlp::{backward, forward, Activation, MlpConfig, MlpParams, N_CLASSES};
use crate::sampler::TaskSampler;
use crate::tasks::SubtaskSet;
use crate::tensor::cross_entropy_loss;

/// Configuration rejected before any computation runs.
///
/// Every variant is fatal: a run with a bad configuration produces no
/// partial output.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `k > n`: a parity cannot read more bits than the string has.
    ParityWiderThanInput { k: usize, n: usize },
    /// Activation identifier is not one of ReLU / Tanh / Sigmoid.
    UnknownActivation(String),
    /// The Zipfian law over task ranks requires `alpha > 1`.
    ImproperSkew(f64),
    /// The learner needs at least one affine layer.
    InvalidDepth(usize),
    /// Evaluation period must be at least 1 step.
    ZeroLogFreq,
    /// A task mixture needs at least one task.
    NoTasks,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ParityWiderThanInput { k, n } => {
                write!(f, "parity size k={} exceeds bit string length n={}", k, n)
            }
            ConfigError::UnknownActivation(name) => {
                write!(f, "unrecognized activation identifier: {:?} (expected ReLU, Tanh or Sigmoid)", name)
            }
            ConfigError::ImproperSkew(alpha) => {
                write!(f, "zipfian skew alpha={} is not > 1", alpha)
            }
            ConfigError::InvalidDepth(depth) => {
                write!(f, "learner depth must be >= 1, got {}", depth)
            }
            ConfigError::ZeroLogFreq => write!(f, "log_freq must be >= 1"),
            ConfigError::NoTasks => write!(f, "n_tasks must be >= 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything a single run needs. Defaults mirror the reference experiment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of parity subtasks in the mixture.
    pub n_tasks: usize,
    /// Bit string length.
    pub n: usize,
    /// Bits per parity (k <= n).
    pub k: usize,
    /// Zipfian skew over task ranks (> 1).
    pub alpha: f64,
    /// Hidden layer width.
    pub width: usize,
    /// Number of affine layers (>= 1).
    pub depth: usize,
    /// Nonlinearity identifier: ReLU, Tanh or Sigmoid.
    pub activation: String,
    /// Total training steps.
    pub steps: usize,
    /// Examples per training batch.
    pub batch_size: usize,
    /// Adam step size.
    pub lr: f32,
    /// Aggregate evaluation batch size.
    pub test_points: usize,
    /// Per-subtask probe batch size.
    pub test_points_per_task: usize,
    /// Evaluation period in steps.
    pub log_freq: usize,
    /// Seed for the run's single RNG.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            n_tasks: 100,
            n: 50,
            k: 3,
            alpha: 1.5,
            width: 100,
            depth: 2,
            activation: "ReLU".to_string(),
            steps: 25_000,
            batch_size: 10_000,
            lr: 1e-3,
            test_points: 30_000,
            test_points_per_task: 1_000,
            log_freq: 25,
            seed: 0,
        }
    }
}

impl RunConfig {
    /// Eager validation of every fatal condition, before any work happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_tasks == 0 {
            return Err(ConfigError::NoTasks);
        }
        if self.k > self.n {
            return Err(ConfigError::ParityWiderThanInput { k: self.k, n: self.n });
        }
        if !self.alpha.is_finite() || self.alpha <= 1.0 {
            return Err(ConfigError::ImproperSkew(self.alpha));
        }
        if self.depth == 0 {
            return Err(ConfigError::InvalidDepth(self.depth));
        }
        if self.log_freq == 0 {
            return Err(ConfigError::ZeroLogFreq);
        }
        Activation::from_name(&self.activation)?;
        Ok(())
    }
}

/// Durable artifact of a completed run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub config: RunConfig,
    /// Trainable scalar count of the learner (P).
    pub param_count: usize,
    /// Nominal examples seen: steps * batch_size (D).
    pub examples_seen: usize,
    /// The subtask set the run trained on.
    pub subtasks: Vec<Vec<usize>>,
    pub metrics: MetricsStore,
}

/// Execute one full run. Fails only on configuration errors; everything
/// after validation proceeds to completion.
pub fn run(config: &RunConfig) -> Result<RunRecord, ConfigError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    let subtasks = SubtaskSet::sample(config.n, config.k, config.n_tasks, &mut rng)?;
    let sampler = TaskSampler::new(config.n_tasks, config.alpha)?;

    let mlp_cfg = MlpConfig {
        in_dim: config.n_tasks + config.n,
        width: config.width,
        depth: config.depth,
        activation: Activation::from_name(&config.activation)?,
    };
    let mut params = MlpParams::init(&mlp_cfg, &mut rng)?;
    let mut opt = Adam::new(&params, AdamConfig::default());
    let mut store = MetricsStore::new(config.n_tasks);

    info!(
        param_count = params.param_count(),
        examples_seen = config.steps * config.batch_size,
        "model built"
    );

    for step in 0..config.steps {
        if step % config.log_freq == 0 {
            let event = evaluate(
                &params,
                &subtasks,
                &sampler,
                config.test_points,
                config.test_points_per_task,
                step,
                &mut rng,
            );
            store.record(&event);
        }

        let composition = sampler.draw_composition(config.batch_size, &mut rng);
        let batch = synthesize_batch(&subtasks, &composition, &mut rng);
        let (logits, cache) = forward(&params, &batch.x, batch.rows);
        let loss = cross_entropy_loss(&logits, &batch.y, batch.rows, N_CLASSES);
        let grads = backward(&params, &cache, &logits, &batch.y, batch.rows);
        opt.step(&mut params, &grads, config.lr);

        debug!(step, loss, "training step");
    }

    info!(
        steps = config.steps,
        evaluations = store.len(),
        "run complete"
    );

    Ok(RunRecord {
        config: config.clone(),
        param_count: params.param_count(),
        examples_seen: config.steps * config.batch_size,
        subtasks: subtasks.sets,
        metrics: store,
    })
}
