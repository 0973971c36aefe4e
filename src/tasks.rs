//! Subtask definition: which bit positions each parity subtask reads.
//!
//! A `SubtaskSet` is fixed at run start from the seeded RNG and read-only
//! afterwards. Task `i` labels a bit string by the XOR of the bits at
//! `sets[i]`. Duplicate subsets across task indices are permitted — the task
//! identity channel keeps them distinguishable to the learner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::train::ConfigError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubtaskSet {
    /// Bit string length.
    pub n: usize,
    /// Bits per parity.
    pub k: usize,
    /// `sets[i]` is a size-`k` subset of `[0, n)`.
    pub sets: Vec<Vec<usize>>,
}

impl SubtaskSet {
    /// Draw `n_tasks` independent uniform without-replacement size-`k`
    /// subsets of `{0, .., n-1}`. Fails if `k > n`; consumes randomness
    /// deterministically, so equal seeds reproduce equal subtask sets.
    pub fn sample<R: Rng>(n: usize, k: usize, n_tasks: usize, rng: &mut R) -> Result<Self, ConfigError> {
        if k > n {
            return Err(ConfigError::ParityWiderThanInput { k, n });
        }
        let sets = (0..n_tasks)
            .map(|_| rand::seq::index::sample(rng, n, k).into_vec())
            .collect();
        Ok(SubtaskSet { n, k, sets })
    }

    pub fn n_tasks(&self) -> usize {
        self.sets.len()
    }

    /// Parity label for `bits` under task `task`: XOR of the selected bits.
    pub fn parity(&self, task: usize, bits: &[u8]) -> usize {
        debug_assert_eq!(bits.len(), self.n);
        let mut acc = 0usize;
        for &pos in &self.sets[task] {
            acc ^= bits[pos] as usize;
        }
        acc & 1
    }
}
