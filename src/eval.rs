//! Periodic evaluation: one Zipfian-mixture probe for aggregate metrics plus
//! one uniform fixed-size probe per subtask.
//!
//! Both measurements run through the cache-free forward path — no gradients
//! exist here and parameters are read-only. Aggregate loss is recomputed on
//! the fresh probe batch, so every entry at position `t` in the store
//! describes the same batch.

use rand::Rng;
use tracing::debug;

use crate::batch::synthesize_batch;
use crate::metrics::{EvalEvent, TaskEval};
use crate::mlp::{forward_logits, MlpParams, N_CLASSES};
use crate::sampler::TaskSampler;
use crate::tasks::SubtaskSet;
use crate::tensor::{count_correct, cross_entropy_loss};

/// Run both measurements for the evaluation trigger at `step`.
pub fn evaluate<R: Rng>(
    params: &MlpParams,
    subtasks: &SubtaskSet,
    sampler: &TaskSampler,
    test_points: usize,
    test_points_per_task: usize,
    step: usize,
    rng: &mut R,
) -> EvalEvent {
    // Aggregate probe: same mixture law as training batches.
    let composition = sampler.draw_composition(test_points, rng);
    let probe = synthesize_batch(subtasks, &composition, rng);
    let logits = forward_logits(params, &probe.x, probe.rows);
    let accuracy = if probe.rows == 0 {
        0.0
    } else {
        count_correct(&logits, &probe.y, probe.rows, N_CLASSES) as f32 / probe.rows as f32
    };
    let loss = cross_entropy_loss(&logits, &probe.y, probe.rows, N_CLASSES);

    // Per-subtask probes: uniform bits, single task each, bypassing the
    // mixture sampler entirely.
    let per_task = (0..subtasks.n_tasks())
        .map(|task| {
            let probe = synthesize_batch(subtasks, &[(task, test_points_per_task)], rng);
            let logits = forward_logits(params, &probe.x, probe.rows);
            TaskEval {
                accuracy: count_correct(&logits, &probe.y, probe.rows, N_CLASSES) as f32
                    / probe.rows.max(1) as f32,
                loss: cross_entropy_loss(&logits, &probe.y, probe.rows, N_CLASSES),
            }
        })
        .collect();

    debug!(step, accuracy, loss, "evaluation event");

    EvalEvent {
        step,
        accuracy,
        loss,
        per_task,
    }
}
