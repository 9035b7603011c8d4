//! Mutation: independent additive noise on genome entries.
//!
//! Each gene is perturbed with probability `rate`. Perturbed genes are clamped
//! to `[-bound, bound]`; untouched genes are left exactly as they were, so a
//! rate of zero is the identity. Noise that would push a gene sitting on the
//! bound further out is reflected inward, so clamping never cancels a mutation.
//!
//! With `adaptive` enabled both the rate and the noise scale are multiplied by
//! `2 - diversity`: a converged population (diversity near 0) mutates twice as
//! often and twice as far as a fully diverse one.

use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::genome::Genome;

/// Noise added to a mutated gene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Perturbation {
    /// Uniform in `[-half_width, half_width]`, never exactly zero.
    Uniform { half_width: f32 },
    /// Normal with mean 0 and standard deviation `sigma`.
    Gaussian { sigma: f32 },
}

impl Default for Perturbation {
    fn default() -> Self {
        Self::Gaussian { sigma: 0.2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Per-gene mutation probability before adaptation.
    pub rate: f32,
    pub perturbation: Perturbation,
    /// Mutated genes are clamped to `[-bound, bound]`.
    pub bound: f32,
    /// Scale rate and noise by `2 - diversity`.
    pub adaptive: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.1,
            perturbation: Perturbation::default(),
            bound: 2.0,
            adaptive: true,
        }
    }
}

impl MutationConfig {
    fn pressure(&self, diversity: f32) -> f32 {
        if self.adaptive {
            2.0 - diversity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Per-gene probability actually used for the given diversity.
    #[must_use]
    pub fn effective_rate(&self, diversity: f32) -> f32 {
        (self.rate * self.pressure(diversity)).clamp(0.0, 1.0)
    }

    /// Multiplier applied to the noise width for the given diversity.
    #[must_use]
    pub fn effective_scale(&self, diversity: f32) -> f32 {
        self.pressure(diversity)
    }
}

/// Mutates `genome` in place.
///
/// A Gaussian perturbation whose scaled `sigma` is negative or not finite adds
/// no noise, and the genome is left unchanged.
pub fn mutate<R>(genome: &mut Genome, config: &MutationConfig, diversity: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let rate = config.effective_rate(diversity);
    if rate <= 0.0 {
        return;
    }
    let scale = config.effective_scale(diversity);
    let noise = match config.perturbation {
        Perturbation::Uniform { half_width } => Noise::Uniform(half_width * scale),
        Perturbation::Gaussian { sigma } => {
            let Ok(normal) = Normal::new(0.0, sigma * scale) else {
                return;
            };
            Noise::Gaussian(normal)
        }
    };

    for gene in genome.genes_mut() {
        if !rng.random_bool(f64::from(rate)) {
            continue;
        }
        let delta = match &noise {
            Noise::Uniform(half_width) => nonzero_uniform(*half_width, rng),
            Noise::Gaussian(normal) => rng.sample(normal),
        };
        *gene = perturb(*gene, delta, config.bound);
    }
}

/// Adds `delta` to `gene` and clamps to `[-bound, bound]`, reflecting `delta`
/// when the gene already sits on the bound it points past.
fn perturb(gene: f32, delta: f32, bound: f32) -> f32 {
    let outward = (gene >= bound && delta > 0.0) || (gene <= -bound && delta < 0.0);
    let delta = if outward { -delta } else { delta };
    (gene + delta).clamp(-bound, bound)
}

enum Noise {
    Uniform(f32),
    Gaussian(Normal<f32>),
}

fn nonzero_uniform<R>(half_width: f32, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    if half_width <= 0.0 {
        return 0.0;
    }
    loop {
        let delta = rng.random_range(-half_width..=half_width);
        if delta != 0.0 {
            return delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn uniform(rate: f32, half_width: f32) -> MutationConfig {
        MutationConfig {
            rate,
            perturbation: Perturbation::Uniform { half_width },
            bound: 2.0,
            adaptive: false,
        }
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mut rng = Pcg32::seed_from_u64(0);
        let original = Genome::from(vec![-3.0, -1.0, 0.0, 0.5, 2.5]);
        for config in [
            uniform(0.0, 0.1),
            MutationConfig {
                rate: 0.0,
                ..MutationConfig::default()
            },
        ] {
            for diversity in [0.0, 0.5, 1.0] {
                let mut genome = original.clone();
                mutate(&mut genome, &config, diversity, &mut rng);
                assert_eq!(genome, original);
            }
        }
    }

    #[test]
    fn test_full_rate_changes_every_gene_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let original = Genome::from_fn(10, |i| i as f32 / 10.0 - 0.5);
        let mut genome = original.clone();
        mutate(&mut genome, &uniform(1.0, 0.1), 0.5, &mut rng);
        assert_eq!(genome.len(), 10);
        for (before, after) in original.genes().iter().zip(genome.genes()) {
            assert_ne!(before, after);
            assert!((before - after).abs() <= 0.1 + 1e-6);
            assert!((-2.0..=2.0).contains(after));
        }
    }

    #[test]
    fn test_clamps_to_bound() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut genome = Genome::from(vec![1.9; 200]);
        let config = MutationConfig {
            rate: 1.0,
            perturbation: Perturbation::Gaussian { sigma: 5.0 },
            bound: 2.0,
            adaptive: false,
        };
        mutate(&mut genome, &config, 1.0, &mut rng);
        assert!(genome.genes().iter().all(|g| (-2.0..=2.0).contains(g)));
        assert!(genome.genes().contains(&2.0));
    }

    #[test]
    fn test_adaptive_pressure() {
        let config = MutationConfig {
            rate: 0.3,
            adaptive: true,
            ..MutationConfig::default()
        };
        assert_eq!(config.effective_rate(1.0), 0.3);
        assert_eq!(config.effective_rate(0.0), 0.6);
        assert_eq!(config.effective_scale(0.0), 2.0);
        assert_eq!(config.effective_scale(1.0), 1.0);

        let saturated = MutationConfig {
            rate: 0.8,
            ..config
        };
        assert_eq!(saturated.effective_rate(0.0), 1.0);
    }

    #[test]
    fn test_genes_on_the_bound_still_change() {
        let mut rng = Pcg32::seed_from_u64(3);
        let original = Genome::from_fn(10, |i| if i % 2 == 0 { 2.0 } else { -2.0 });
        let mut genome = original.clone();
        mutate(&mut genome, &uniform(1.0, 0.1), 0.5, &mut rng);
        for (before, after) in original.genes().iter().zip(genome.genes()) {
            assert_ne!(before, after);
            assert!((before - after).abs() <= 0.1 + 1e-6);
            assert!((-2.0..=2.0).contains(after));
        }
    }

    #[test]
    fn test_low_diversity_widens_gaussian_noise() {
        let config = MutationConfig {
            rate: 1.0,
            perturbation: Perturbation::Gaussian { sigma: 0.1 },
            bound: 10.0,
            adaptive: true,
        };
        let mean_shift = |diversity: f32, rng: &mut Pcg32| {
            let original = Genome::from_fn(2000, |_| 0.0);
            let mut genome = original.clone();
            mutate(&mut genome, &config, diversity, rng);
            genome.mean_abs_difference(&original)
        };
        let mut rng = Pcg32::seed_from_u64(4);
        let converged = mean_shift(0.0, &mut rng);
        let diverse = mean_shift(1.0, &mut rng);
        // E|N(0, s)| = s * sqrt(2 / pi), so the ratio should be close to 2
        let ratio = converged / diverse;
        assert!((1.7..2.3).contains(&ratio), "ratio = {ratio}");
    }

    #[test]
    fn test_invalid_sigma_leaves_genome_unchanged() {
        let mut rng = Pcg32::seed_from_u64(5);
        let original = Genome::from(vec![0.5; 8]);
        let mut genome = original.clone();
        let config = MutationConfig {
            rate: 1.0,
            perturbation: Perturbation::Gaussian { sigma: -1.0 },
            ..MutationConfig::default()
        };
        mutate(&mut genome, &config, 1.0, &mut rng);
        assert_eq!(genome, original);
    }
}
