//! Crossover operators combining two parent genomes into one child.
//!
//! - [`CrossoverKind::Uniform`] copies each gene from either parent with equal probability
//! - [`CrossoverKind::Blend`] draws each gene uniformly between the two parent genes
//!   (BLX-α with α = 0, so children never leave the parents' box)
//!
//! The child always has exactly the parents' length and layout.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    IncompatibleArchitectureError, ShapeError, ShapeKind,
    genome::{self, Genome},
    policy::NeuralPolicy,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    Uniform,
    #[default]
    Blend,
}

/// Combines two genomes of equal length.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the parents differ in length.
pub fn crossover<R>(
    a: &Genome,
    b: &Genome,
    kind: CrossoverKind,
    rng: &mut R,
) -> Result<Genome, ShapeError>
where
    R: Rng + ?Sized,
{
    if a.len() != b.len() {
        return Err(ShapeError {
            kind: ShapeKind::Genome,
            expected: a.len(),
            actual: b.len(),
        });
    }
    let (a, b) = (a.genes(), b.genes());
    Ok(Genome::from_fn(a.len(), |i| match kind {
        CrossoverKind::Uniform => {
            if rng.random_bool(0.5) {
                a[i]
            } else {
                b[i]
            }
        }
        CrossoverKind::Blend => {
            let (min, max) = (f32::min(a[i], b[i]), f32::max(a[i], b[i]));
            rng.random_range(min..=max)
        }
    }))
}

/// Breeds two compatible policies into a child with the same architecture.
///
/// The child uses the first parent's activation.
pub fn crossover_policies<R>(
    a: &NeuralPolicy,
    b: &NeuralPolicy,
    kind: CrossoverKind,
    rng: &mut R,
) -> Result<NeuralPolicy, IncompatibleArchitectureError>
where
    R: Rng + ?Sized,
{
    let incompatible = IncompatibleArchitectureError {
        left: a.architecture(),
        right: b.architecture(),
    };
    if !a.is_compatible(b) {
        return Err(incompatible);
    }
    let child = crossover(&genome::encode(a), &genome::encode(b), kind, rng)
        .map_err(|_| incompatible)?;
    let policy = genome::decode(&child, a.architecture()).map_err(|_| incompatible)?;
    Ok(policy.with_activation(a.activation()))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::policy::{Activation, Architecture};

    #[test]
    fn test_child_length_matches_parents() {
        let mut rng = Pcg32::seed_from_u64(0);
        let a = Genome::from_fn(99, |i| i as f32 / 100.0);
        let b = Genome::from_fn(99, |i| -(i as f32) / 100.0);
        for kind in [CrossoverKind::Uniform, CrossoverKind::Blend] {
            assert_eq!(crossover(&a, &b, kind, &mut rng).unwrap().len(), 99);
        }
    }

    #[test]
    fn test_uniform_copies_parent_genes() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = Genome::from(vec![1.0; 64]);
        let b = Genome::from(vec![-1.0; 64]);
        let child = crossover(&a, &b, CrossoverKind::Uniform, &mut rng).unwrap();
        assert!(child.genes().iter().all(|g| *g == 1.0 || *g == -1.0));
        assert!(child.genes().contains(&1.0));
        assert!(child.genes().contains(&-1.0));
    }

    #[test]
    fn test_blend_stays_between_parents() {
        let mut rng = Pcg32::seed_from_u64(2);
        let a = Genome::from(vec![0.5, -1.0, 2.0, 0.0]);
        let b = Genome::from(vec![-0.5, -1.0, 1.0, 0.0]);
        for _ in 0..100 {
            let child = crossover(&a, &b, CrossoverKind::Blend, &mut rng).unwrap();
            let genes = child.genes();
            assert!((-0.5..=0.5).contains(&genes[0]));
            assert_eq!(genes[1], -1.0);
            assert!((1.0..=2.0).contains(&genes[2]));
            assert_eq!(genes[3], 0.0);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let mut rng = Pcg32::seed_from_u64(3);
        let err = crossover(
            &Genome::from(vec![0.0; 3]),
            &Genome::from(vec![0.0; 4]),
            CrossoverKind::Blend,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err.kind, ShapeKind::Genome);
    }

    #[test]
    fn test_policies_must_be_compatible() {
        let mut rng = Pcg32::seed_from_u64(4);
        let a = NeuralPolicy::random(&mut rng, Architecture::new(8, 8, 3), Activation::Tanh);
        let b = NeuralPolicy::random(&mut rng, Architecture::new(5, 8, 3), Activation::Tanh);
        assert!(crossover_policies(&a, &b, CrossoverKind::Blend, &mut rng).is_err());

        let c = NeuralPolicy::random(&mut rng, Architecture::new(8, 8, 3), Activation::Tanh);
        let child = crossover_policies(&a, &c, CrossoverKind::Uniform, &mut rng).unwrap();
        assert_eq!(child.architecture(), a.architecture());
        assert_eq!(child.activation(), Activation::Tanh);
    }
}
