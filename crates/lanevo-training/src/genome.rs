//! Flat parameter vectors and the codec between them and [`NeuralPolicy`].
//!
//! A [`Genome`] lists a policy's parameters in a fixed order:
//!
//! ```text
//! [ W_in (hidden × input) | W_out (output × hidden) | b_hidden | b_out ]
//! ```
//!
//! Every matrix is flattened row-major. All genomes of a run share this layout,
//! so genetic operators can work position by position without knowing which
//! gene is which.

use serde::{Deserialize, Serialize};

use crate::{
    ShapeError, ShapeKind,
    policy::{Architecture, NeuralPolicy},
};

/// An ordered, fixed-length vector of policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome(Vec<f32>);

impl From<Vec<f32>> for Genome {
    fn from(genes: Vec<f32>) -> Self {
        Self(genes)
    }
}

impl Genome {
    /// Creates a genome by applying `f` to each gene index.
    ///
    /// ```
    /// use lanevo_training::genome::Genome;
    ///
    /// let genome = Genome::from_fn(4, |i| i as f32 * 0.5);
    /// assert_eq!(genome.genes(), &[0.0, 0.5, 1.0, 1.5]);
    /// ```
    pub fn from_fn<F>(len: usize, f: F) -> Self
    where
        F: FnMut(usize) -> f32,
    {
        Self((0..len).map(f).collect())
    }

    #[must_use]
    pub fn genes(&self) -> &[f32] {
        &self.0
    }

    pub fn genes_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }

    #[must_use]
    pub fn into_genes(self) -> Vec<f32> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean absolute gene-wise difference to `other`.
    ///
    /// Returns `0.0` for empty genomes. Both genomes are expected to share one
    /// layout; extra genes of the longer one are ignored.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_abs_difference(&self, other: &Self) -> f32 {
        let len = usize::min(self.len(), other.len());
        if len == 0 {
            return 0.0;
        }
        let total = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>();
        total / len as f32
    }
}

/// Flattens a policy's parameters into a genome.
#[must_use]
pub fn encode(policy: &NeuralPolicy) -> Genome {
    let mut genes = Vec::with_capacity(policy.architecture().genome_len());
    genes.extend_from_slice(policy.weights_input_hidden());
    genes.extend_from_slice(policy.weights_hidden_output());
    genes.extend_from_slice(policy.biases_hidden());
    genes.extend_from_slice(policy.biases_output());
    Genome(genes)
}

/// Rebuilds a policy from a genome laid out for `architecture`.
///
/// The policy uses the default activation; see
/// [`NeuralPolicy::with_activation`] to change it.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the genome length differs from
/// [`Architecture::genome_len`].
pub fn decode(genome: &Genome, architecture: Architecture) -> Result<NeuralPolicy, ShapeError> {
    let expected = architecture.genome_len();
    if genome.len() != expected {
        return Err(ShapeError {
            kind: ShapeKind::Genome,
            expected,
            actual: genome.len(),
        });
    }

    let Architecture {
        input_nodes,
        hidden_nodes,
        output_nodes,
    } = architecture;
    let (weights_input_hidden, rest) = genome.genes().split_at(hidden_nodes * input_nodes);
    let (weights_hidden_output, rest) = rest.split_at(output_nodes * hidden_nodes);
    let (biases_hidden, biases_output) = rest.split_at(hidden_nodes);

    Ok(NeuralPolicy::from_blocks(
        architecture,
        weights_input_hidden.to_vec(),
        weights_hidden_output.to_vec(),
        biases_hidden.to_vec(),
        biases_output.to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::policy::Activation;

    #[test]
    fn test_roundtrip_reproduces_policy() {
        let mut rng = Pcg32::seed_from_u64(10);
        for architecture in [
            Architecture::default(),
            Architecture::new(5, 4, 3),
            Architecture::new(1, 1, 1),
        ] {
            let policy = NeuralPolicy::random(&mut rng, architecture, Activation::Sigmoid);
            let genome = encode(&policy);
            assert_eq!(genome.len(), architecture.genome_len());
            assert_eq!(decode(&genome, architecture).unwrap(), policy);
        }
    }

    #[test]
    fn test_layout_order() {
        let architecture = Architecture::new(2, 1, 1);
        let genome = Genome::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let policy = decode(&genome, architecture).unwrap();
        assert_eq!(policy.weights_input_hidden(), &[1.0, 2.0]);
        assert_eq!(policy.weights_hidden_output(), &[3.0]);
        assert_eq!(policy.biases_hidden(), &[4.0]);
        assert_eq!(policy.biases_output(), &[5.0]);
        assert_eq!(encode(&policy), genome);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let genome = Genome::from(vec![0.0; 10]);
        assert_eq!(
            decode(&genome, Architecture::default()),
            Err(ShapeError {
                kind: ShapeKind::Genome,
                expected: 99,
                actual: 10,
            })
        );
    }

    #[test]
    fn test_mean_abs_difference() {
        let a = Genome::from(vec![0.0, 1.0, -1.0, 0.5]);
        let b = Genome::from(vec![1.0, 1.0, 1.0, 0.5]);
        assert_eq!(a.mean_abs_difference(&b), 0.75);
        assert_eq!(a.mean_abs_difference(&a), 0.0);
        assert_eq!(Genome::from(vec![]).mean_abs_difference(&a), 0.0);
    }
}
