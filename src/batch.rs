//! Batch synthesis for a requested multiset of subtask assignments.
//!
//! Each row is `[one-hot task channel (n_tasks) | bit string (n)]` as f32,
//! with the parity label as a `usize` in {0, 1}. Rows are laid out in the
//! order the composition supplies its (task, count) pairs.

use rand::Rng;

use crate::tasks::SubtaskSet;

/// A synthesized batch: row-major inputs plus integer labels.
#[derive(Clone, Debug)]
pub struct Batch {
    /// Inputs, `rows * cols` where `cols = n_tasks + n`.
    pub x: Vec<f32>,
    /// Parity labels in {0, 1}, one per row.
    pub y: Vec<usize>,
    pub rows: usize,
    pub cols: usize,
}

/// Build a batch from (task index, count) pairs. Pairs with count 0
/// contribute nothing; an empty composition yields an empty batch.
pub fn synthesize_batch<R: Rng>(
    subtasks: &SubtaskSet,
    composition: &[(usize, usize)],
    rng: &mut R,
) -> Batch {
    let n_tasks = subtasks.n_tasks();
    let n = subtasks.n;
    let cols = n_tasks + n;
    let rows: usize = composition.iter().map(|&(_, c)| c).sum();

    let mut x = vec![0.0f32; rows * cols];
    let mut y = vec![0usize; rows];
    let mut bits = vec![0u8; n];

    let mut row = 0;
    for &(task, count) in composition {
        debug_assert!(task < n_tasks);
        for _ in 0..count {
            for b in bits.iter_mut() {
                *b = rng.gen_range(0..2u8);
            }
            let base = row * cols;
            x[base + task] = 1.0;
            for (j, &b) in bits.iter().enumerate() {
                x[base + n_tasks + j] = b as f32;
            }
            y[row] = subtasks.parity(task, &bits);
            row += 1;
        }
    }
    debug_assert_eq!(row, rows);

    Batch { x, y, rows, cols }
}
