//! End-to-end run tests: evaluation cadence, determinism, record
//! persistence, and a small learning check on an easy parity mixture.

use rand::rngs::StdRng;
use rand::SeedableRng;

use parity_mix::batch::synthesize_batch;
use parity_mix::sampler::TaskSampler;
use parity_mix::tasks::SubtaskSet;
use parity_mix::train::{run, RunConfig};

fn small_config() -> RunConfig {
    RunConfig {
        n_tasks: 4,
        n: 10,
        k: 2,
        alpha: 1.5,
        width: 8,
        depth: 2,
        activation: "ReLU".to_string(),
        steps: 10,
        batch_size: 32,
        lr: 1e-3,
        test_points: 64,
        test_points_per_task: 16,
        log_freq: 3,
        seed: 7,
    }
}

#[test]
fn test_evaluation_cadence() {
    // steps=10, log_freq=3 → triggers at 0, 3, 6, 9 = ceil(10/3) events.
    let record = run(&small_config()).unwrap();
    assert_eq!(record.metrics.log_steps, vec![0, 3, 6, 9]);
    assert_eq!(record.metrics.len(), 4);
    assert_eq!(record.metrics.accuracies.len(), 4);
    assert_eq!(record.metrics.losses.len(), 4);
    for task in 0..4 {
        assert_eq!(
            record.metrics.accuracies_subtasks[task].len(),
            record.metrics.len(),
            "per-subtask series must match the aggregate series length"
        );
        assert_eq!(record.metrics.losses_subtasks[task].len(), record.metrics.len());
    }
}

#[test]
fn test_identical_seed_reproduces_run() {
    let cfg = small_config();
    let a = run(&cfg).unwrap();
    let b = run(&cfg).unwrap();

    assert_eq!(a.subtasks, b.subtasks, "same seed must yield the same subtask set");
    assert_eq!(a.param_count, b.param_count);
    assert_eq!(a.metrics, b.metrics, "same seed must yield identical metric series");
}

#[test]
fn test_different_seed_changes_subtasks() {
    let mut cfg = small_config();
    let a = run(&cfg).unwrap();
    cfg.seed = 8;
    let b = run(&cfg).unwrap();
    assert_ne!(a.subtasks, b.subtasks, "different seeds should draw different subtask sets");
}

#[test]
fn test_record_json_roundtrip() {
    let record = run(&small_config()).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    let back: parity_mix::train::RunRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.metrics, record.metrics);
    assert_eq!(back.subtasks, record.subtasks);
    assert_eq!(back.examples_seen, record.examples_seen);
}

#[test]
fn test_end_to_end_single_step_example() {
    // Reference scenario: n=10, k=2, n_tasks=4, alpha=1.5, batch_size=8,
    // steps=1, log_freq=1 — exactly one evaluation event, at step 0.
    let cfg = RunConfig {
        n_tasks: 4,
        n: 10,
        k: 2,
        alpha: 1.5,
        width: 8,
        depth: 2,
        activation: "ReLU".to_string(),
        steps: 1,
        batch_size: 8,
        lr: 1e-3,
        test_points: 32,
        test_points_per_task: 8,
        log_freq: 1,
        seed: 0,
    };
    let record = run(&cfg).unwrap();
    assert_eq!(record.metrics.log_steps, vec![0]);
    assert_eq!(record.examples_seen, 8);
    assert_eq!(record.subtasks.len(), 4);
    for set in &record.subtasks {
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|&p| p < 10));
    }
}

#[test]
fn test_training_batches_favor_low_ranks() {
    // The same scenario's training batch: 8 rows, one-hot indices in
    // {0..3}, with rank 1 (task 0) drawing at least as much as rank 4
    // (task 3) in expectation — checked over repeated trials.
    let mut rng = StdRng::seed_from_u64(2);
    let subtasks = SubtaskSet::sample(10, 2, 4, &mut rng).unwrap();
    let sampler = TaskSampler::new(4, 1.5).unwrap();

    let mut total_task0 = 0usize;
    let mut total_task3 = 0usize;
    for _ in 0..500 {
        let comp = sampler.draw_composition(8, &mut rng);
        let batch = synthesize_batch(&subtasks, &comp, &mut rng);
        assert_eq!(batch.rows, 8, "training batch must have exactly batch_size rows");
        for r in 0..batch.rows {
            let channel = &batch.x[r * batch.cols..r * batch.cols + 4];
            let hot: Vec<usize> = (0..4).filter(|&j| channel[j] == 1.0).collect();
            assert_eq!(hot.len(), 1);
            match hot[0] {
                0 => total_task0 += 1,
                3 => total_task3 += 1,
                1 | 2 => {}
                _ => panic!("task index out of range"),
            }
        }
    }
    assert!(
        total_task0 > total_task3,
        "rank 1 should outdraw rank 4 over 500 trials: {} vs {}",
        total_task0,
        total_task3
    );
}

#[test]
fn test_learner_improves_on_easy_mixture() {
    // Two k=2 parities over 8 bits: comfortably learnable in a few hundred
    // Adam steps. Aggregate loss should drop well below its starting point
    // (≈ ln 2) and accuracy should leave chance behind.
    let cfg = RunConfig {
        n_tasks: 2,
        n: 8,
        k: 2,
        alpha: 1.5,
        width: 32,
        depth: 2,
        activation: "ReLU".to_string(),
        steps: 400,
        batch_size: 96,
        lr: 1e-2,
        test_points: 384,
        test_points_per_task: 96,
        log_freq: 80,
        seed: 3,
    };
    let record = run(&cfg).unwrap();
    let losses = &record.metrics.losses;
    let accs = &record.metrics.accuracies;

    let first_loss = losses[0];
    let last_loss = *losses.last().unwrap();
    let last_acc = *accs.last().unwrap();

    assert!(
        last_loss < first_loss,
        "loss should decrease over training: {} → {}",
        first_loss,
        last_loss
    );
    assert!(
        last_acc > 0.75,
        "accuracy should leave chance behind, got {}",
        last_acc
    );
    assert!(losses.iter().all(|l| l.is_finite()));
}
