//! Genetic diversity of a population.
//!
//! Diversity is the average, over every pair of sampled genomes, of their mean
//! absolute gene-wise difference, clamped to `[0, 1]`. Only a bounded sample
//! is compared, so the cost grows with the square of the sample cap rather
//! than the population size.
//!
//! The value steers breeding: low diversity widens mutation and enlarges the
//! elite (see [`crate::mutation`] and [`crate::config::ElitePolicy`]).

use rand::{Rng, seq::IndexedRandom as _};

use crate::genome::Genome;

/// Default upper bound on the number of genomes compared.
pub const DEFAULT_SAMPLE_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiversityEstimator {
    sample_cap: usize,
}

impl Default for DiversityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAP)
    }
}

impl DiversityEstimator {
    #[must_use]
    pub const fn new(sample_cap: usize) -> Self {
        Self { sample_cap }
    }

    /// Estimates diversity of `genomes` in `[0, 1]`.
    ///
    /// Draws `min(sample_cap, genomes.len())` genomes without replacement.
    /// Returns `1.0` when fewer than two genomes can be compared.
    pub fn estimate<R>(&self, genomes: &[Genome], rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        let sample_size = usize::min(self.sample_cap, genomes.len());
        if sample_size < 2 {
            return 1.0;
        }
        let sample = genomes
            .choose_multiple(rng, sample_size)
            .collect::<Vec<_>>();

        let mut total = 0.0;
        let mut pairs = 0_u32;
        for (i, a) in sample.iter().enumerate() {
            for b in &sample[i + 1..] {
                total += a.mean_abs_difference(b);
                pairs += 1;
            }
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = total / pairs as f32;
        mean.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_fewer_than_two_is_maximal() {
        let mut rng = Pcg32::seed_from_u64(0);
        let estimator = DiversityEstimator::default();
        assert_eq!(estimator.estimate(&[], &mut rng), 1.0);
        assert_eq!(
            estimator.estimate(&[Genome::from(vec![0.5; 4])], &mut rng),
            1.0
        );
    }

    #[test]
    fn test_identical_genomes_have_no_diversity() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genomes = vec![Genome::from(vec![0.3; 10]); 5];
        assert_eq!(DiversityEstimator::default().estimate(&genomes, &mut rng), 0.0);
    }

    #[test]
    fn test_pairwise_mean() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genomes = vec![
            Genome::from(vec![0.0, 0.0]),
            Genome::from(vec![0.5, 0.5]),
            Genome::from(vec![0.2, 0.2]),
        ];
        // pairs: 0.5, 0.2, 0.3
        let diversity = DiversityEstimator::default().estimate(&genomes, &mut rng);
        assert!((diversity - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_to_one() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genomes = vec![Genome::from(vec![-2.0; 3]), Genome::from(vec![2.0; 3])];
        assert_eq!(DiversityEstimator::default().estimate(&genomes, &mut rng), 1.0);
    }

    #[test]
    fn test_bounded_for_large_populations() {
        let mut rng = Pcg32::seed_from_u64(9);
        let genomes = (0..500)
            .map(|_| Genome::from_fn(20, |_| rng.random_range(-2.0..=2.0)))
            .collect::<Vec<_>>();
        let diversity = DiversityEstimator::new(10).estimate(&genomes, &mut rng);
        assert!((0.0..=1.0).contains(&diversity));
    }

    #[test]
    fn test_cap_below_two_is_maximal() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genomes = vec![Genome::from(vec![0.0; 3]); 4];
        assert_eq!(DiversityEstimator::new(1).estimate(&genomes, &mut rng), 1.0);
    }
}
