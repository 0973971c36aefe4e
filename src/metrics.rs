//! Append-only metrics store, one entry per evaluation event.
//!
//! Five series aligned by position: entry `t` of every series describes the
//! same evaluation event. Per-subtask series are fixed-length vectors indexed
//! by task — the task count is known at configuration time, so nothing grows
//! by key.

use serde::{Deserialize, Serialize};

/// One subtask's measurement within an evaluation event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskEval {
    pub accuracy: f32,
    pub loss: f32,
}

/// Everything measured at a single evaluation trigger.
#[derive(Clone, Debug)]
pub struct EvalEvent {
    /// Training step the event fired at.
    pub step: usize,
    /// Aggregate accuracy on the Zipfian-mixture probe batch.
    pub accuracy: f32,
    /// Aggregate cross-entropy on the same probe batch.
    pub loss: f32,
    /// Per-subtask measurements, exactly `n_tasks` entries in task order.
    pub per_task: Vec<TaskEval>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricsStore {
    pub log_steps: Vec<usize>,
    pub accuracies: Vec<f32>,
    pub losses: Vec<f32>,
    /// `accuracies_subtasks[task]` is that task's accuracy series.
    pub accuracies_subtasks: Vec<Vec<f32>>,
    pub losses_subtasks: Vec<Vec<f32>>,
}

impl MetricsStore {
    pub fn new(n_tasks: usize) -> Self {
        MetricsStore {
            log_steps: Vec::new(),
            accuracies: Vec::new(),
            losses: Vec::new(),
            accuracies_subtasks: vec![Vec::new(); n_tasks],
            losses_subtasks: vec![Vec::new(); n_tasks],
        }
    }

    pub fn n_tasks(&self) -> usize {
        self.accuracies_subtasks.len()
    }

    /// Number of recorded evaluation events.
    pub fn len(&self) -> usize {
        self.log_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_steps.is_empty()
    }

    /// Append one evaluation event to every series. The whole event lands in
    /// a single call, so a reader never observes a partial entry.
    pub fn record(&mut self, event: &EvalEvent) {
        debug_assert_eq!(event.per_task.len(), self.n_tasks());
        self.log_steps.push(event.step);
        self.accuracies.push(event.accuracy);
        self.losses.push(event.loss);
        for (task, te) in event.per_task.iter().enumerate() {
            self.accuracies_subtasks[task].push(te.accuracy);
            self.losses_subtasks[task].push(te.loss);
        }
    }
}
