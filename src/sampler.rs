//! Task-mixture sampler: which subtask each example in a batch belongs to.
//!
//! Ranks `1..=n_tasks` carry probability proportional to `rank^-alpha`; a
//! draw of total size `m` is reduced to a histogram of per-task counts.
//! Rank `r` maps to task index `r - 1` everywhere.

use rand::Rng;
use rand_distr::{Distribution, Zipf};

use crate::train::ConfigError;

pub struct TaskSampler {
    n_tasks: usize,
    zipf: Zipf<f64>,
}

impl TaskSampler {
    /// Build a sampler over ranks `1..=n_tasks` with exponent `alpha`.
    ///
    /// `alpha <= 1` (or a non-finite value) is rejected: the experiment
    /// design treats the skewed regime `alpha > 1` as the defined one, and
    /// silently accepting anything else was a known bug class in the
    /// original harness.
    pub fn new(n_tasks: usize, alpha: f64) -> Result<Self, ConfigError> {
        if n_tasks == 0 {
            return Err(ConfigError::NoTasks);
        }
        if !alpha.is_finite() || alpha <= 1.0 {
            return Err(ConfigError::ImproperSkew(alpha));
        }
        let zipf = Zipf::new(n_tasks as u64, alpha).map_err(|_| ConfigError::ImproperSkew(alpha))?;
        Ok(TaskSampler { n_tasks, zipf })
    }

    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    /// Draw `m` i.i.d. ranks and reduce to (task index, count) pairs in task
    /// index order. Tasks with zero draws are absent from the result; the
    /// returned counts always sum to exactly `m`.
    pub fn draw_composition<R: Rng>(&self, m: usize, rng: &mut R) -> Vec<(usize, usize)> {
        let mut counts = vec![0usize; self.n_tasks];
        for _ in 0..m {
            let rank = self.zipf.sample(rng) as usize;
            debug_assert!((1..=self.n_tasks).contains(&rank));
            counts[rank - 1] += 1;
        }
        counts
            .into_iter()
            .enumerate()
            .filter(|&(_, c)| c > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_alpha_at_or_below_one() {
        assert!(matches!(TaskSampler::new(10, 1.0), Err(ConfigError::ImproperSkew(_))));
        assert!(matches!(TaskSampler::new(10, 0.5), Err(ConfigError::ImproperSkew(_))));
        assert!(matches!(TaskSampler::new(10, f64::NAN), Err(ConfigError::ImproperSkew(_))));
        assert!(TaskSampler::new(10, 1.5).is_ok());
    }

    #[test]
    fn test_rejects_zero_tasks() {
        assert!(matches!(TaskSampler::new(0, 1.5), Err(ConfigError::NoTasks)));
    }

    #[test]
    fn test_histogram_conserves_total() {
        let sampler = TaskSampler::new(8, 1.5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for &m in &[0usize, 1, 7, 500] {
            let comp = sampler.draw_composition(m, &mut rng);
            let total: usize = comp.iter().map(|&(_, c)| c).sum();
            assert_eq!(total, m, "counts must sum to the requested draw size");
            assert!(comp.iter().all(|&(_, c)| c > 0), "zero counts are not materialized");
            assert!(comp.iter().all(|&(t, _)| t < 8), "task indices stay in range");
        }
    }

    #[test]
    fn test_empty_draw_is_empty() {
        let sampler = TaskSampler::new(4, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sampler.draw_composition(0, &mut rng).is_empty());
    }

    #[test]
    fn test_rank_one_dominates_rank_two() {
        // Statistical: with alpha = 1.5 over 5 tasks, P(rank 1) ≈ 2.8x
        // P(rank 2). Over 200k draws the counts separate by a wide margin.
        let sampler = TaskSampler::new(5, 1.5).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts = vec![0usize; 5];
        for (task, c) in sampler.draw_composition(200_000, &mut rng) {
            counts[task] = c;
        }
        assert!(
            counts[0] as f64 > counts[1] as f64 * 1.5,
            "rank 1 should clearly dominate rank 2, got {} vs {}",
            counts[0],
            counts[1]
        );
        assert!(counts[1] > counts[4], "mid ranks still outdraw the tail");
    }

    #[test]
    fn test_draw_deterministic() {
        let sampler = TaskSampler::new(6, 1.4).unwrap();
        let mut rng1 = StdRng::seed_from_u64(21);
        let mut rng2 = StdRng::seed_from_u64(21);
        assert_eq!(
            sampler.draw_composition(100, &mut rng1),
            sampler.draw_composition(100, &mut rng2)
        );
    }
}
