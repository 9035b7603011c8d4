//! Fixed-topology feedforward policy network.
//!
//! A [`NeuralPolicy`] has one hidden layer:
//!
//! ```text
//! hidden = activation(W_in · observation + b_hidden)
//! output = softmax(W_out · hidden + b_out)
//! action = argmax(output)
//! ```
//!
//! `W_in` has `hidden_nodes` rows of `input_nodes` weights and `W_out` has
//! `output_nodes` rows of `hidden_nodes` weights, both stored row-major. The
//! architecture never changes after construction; breeding only ever combines
//! policies with equal [`Architecture`]s.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ShapeError, ShapeKind};

/// Pre-activations are clipped to this magnitude before the nonlinearity.
const ACTIVATION_CLIP: f32 = 50.0;

/// Node counts of a policy network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{input_nodes}-{hidden_nodes}-{output_nodes}")]
pub struct Architecture {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
}

impl Default for Architecture {
    fn default() -> Self {
        Self::new(8, 8, 3)
    }
}

impl Architecture {
    #[must_use]
    pub const fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> Self {
        Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
        }
    }

    /// Number of genes needed to encode a policy with this architecture.
    ///
    /// ```
    /// # use lanevo_training::policy::Architecture;
    /// assert_eq!(Architecture::new(8, 8, 3).genome_len(), 64 + 24 + 8 + 3);
    /// ```
    #[must_use]
    pub const fn genome_len(&self) -> usize {
        self.input_nodes * self.hidden_nodes
            + self.hidden_nodes * self.output_nodes
            + self.hidden_nodes
            + self.output_nodes
    }
}

/// Hidden-layer nonlinearity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
}

impl Activation {
    /// Applies the nonlinearity to a clipped pre-activation.
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        let x = x.clamp(-ACTIVATION_CLIP, ACTIVATION_CLIP);
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

/// A feedforward policy with one hidden layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralPolicy {
    architecture: Architecture,
    activation: Activation,
    weights_input_hidden: Vec<f32>,
    weights_hidden_output: Vec<f32>,
    biases_hidden: Vec<f32>,
    biases_output: Vec<f32>,
}

impl NeuralPolicy {
    /// Creates a policy with every weight and bias uniform in `[-1, 1]`.
    pub fn random<R>(rng: &mut R, architecture: Architecture, activation: Activation) -> Self
    where
        R: Rng + ?Sized,
    {
        let Architecture {
            input_nodes,
            hidden_nodes,
            output_nodes,
        } = architecture;
        let mut block = |len: usize| -> Vec<f32> {
            (0..len).map(|_| rng.random_range(-1.0..=1.0)).collect()
        };
        Self {
            architecture,
            activation,
            weights_input_hidden: block(hidden_nodes * input_nodes),
            weights_hidden_output: block(output_nodes * hidden_nodes),
            biases_hidden: block(hidden_nodes),
            biases_output: block(output_nodes),
        }
    }

    /// Builds a policy from its four parameter blocks.
    ///
    /// Callers guarantee the block lengths match `architecture`.
    pub(crate) fn from_blocks(
        architecture: Architecture,
        weights_input_hidden: Vec<f32>,
        weights_hidden_output: Vec<f32>,
        biases_hidden: Vec<f32>,
        biases_output: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(
            weights_input_hidden.len(),
            architecture.hidden_nodes * architecture.input_nodes
        );
        debug_assert_eq!(
            weights_hidden_output.len(),
            architecture.output_nodes * architecture.hidden_nodes
        );
        debug_assert_eq!(biases_hidden.len(), architecture.hidden_nodes);
        debug_assert_eq!(biases_output.len(), architecture.output_nodes);
        Self {
            architecture,
            activation: Activation::default(),
            weights_input_hidden,
            weights_hidden_output,
            biases_hidden,
            biases_output,
        }
    }

    /// Returns the same policy using `activation` in its hidden layer.
    #[must_use]
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    #[must_use]
    pub const fn architecture(&self) -> Architecture {
        self.architecture
    }

    #[must_use]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns `true` if both policies have the same node counts.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.architecture == other.architecture
    }

    /// Input→hidden weights, `hidden_nodes` rows of `input_nodes`.
    #[must_use]
    pub fn weights_input_hidden(&self) -> &[f32] {
        &self.weights_input_hidden
    }

    /// Hidden→output weights, `output_nodes` rows of `hidden_nodes`.
    #[must_use]
    pub fn weights_hidden_output(&self) -> &[f32] {
        &self.weights_hidden_output
    }

    #[must_use]
    pub fn biases_hidden(&self) -> &[f32] {
        &self.biases_hidden
    }

    #[must_use]
    pub fn biases_output(&self) -> &[f32] {
        &self.biases_output
    }

    /// Runs the network and returns the softmax output distribution.
    pub fn forward(&self, observation: &[f32]) -> Result<Vec<f32>, ShapeError> {
        let Architecture {
            input_nodes,
            hidden_nodes,
            output_nodes,
        } = self.architecture;
        if observation.len() != input_nodes {
            return Err(ShapeError {
                kind: ShapeKind::Observation,
                expected: input_nodes,
                actual: observation.len(),
            });
        }

        let hidden = (0..hidden_nodes)
            .map(|j| {
                let row = &self.weights_input_hidden[j * input_nodes..(j + 1) * input_nodes];
                self.activation
                    .apply(dot(row, observation) + self.biases_hidden[j])
            })
            .collect::<Vec<_>>();
        let logits = (0..output_nodes)
            .map(|k| {
                let row = &self.weights_hidden_output[k * hidden_nodes..(k + 1) * hidden_nodes];
                dot(row, &hidden) + self.biases_output[k]
            })
            .collect::<Vec<_>>();
        Ok(softmax(&logits))
    }

    /// Returns the index of the most probable output.
    ///
    /// Ties go to the lowest index.
    pub fn predict(&self, observation: &[f32]) -> Result<usize, ShapeError> {
        let output = self.forward(observation)?;
        argmax(&output).ok_or(ShapeError {
            kind: ShapeKind::Output,
            expected: 1,
            actual: 0,
        })
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = logits.iter().map(|x| (x - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>();
    exps.into_iter().map(|e| e / sum).collect()
}

fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
