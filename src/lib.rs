//! Training harness for mixtures of sparse parity subtasks.
//!
//! An experiment run draws `n_tasks` size-`k` parity subtasks over an `n`-bit
//! string, trains a feed-forward classifier on batches whose task composition
//! follows a Zipfian law over task ranks, and records aggregate plus
//! per-subtask accuracy/loss series at a fixed step cadence.
//!
//! # Modules
//!
//! - [`tasks`]   — subtask definition (seeded bit-position subsets, parity labels)
//! - [`sampler`] — Zipfian task-mixture sampler
//! - [`batch`]   — batch synthesis (one-hot task channel + random bits)
//! - [`mlp`]     — feed-forward learner: forward, cache, analytical backward
//! - [`adam`]    — Adam optimizer on flat parameter buffers
//! - [`metrics`] — append-only metrics store, one entry per evaluation event
//! - [`eval`]    — aggregate + per-subtask evaluation pass
//! - [`train`]   — run configuration, validation, and the step loop
//! - [`tensor`]  — flat f32 slice math shared by the above

pub mod adam;
pub mod batch;
pub mod eval;
pub mod metrics;
pub mod mlp;
pub mod sampler;
pub mod tasks;
pub mod tensor;
pub mod train;
