//! Run configuration.
//!
//! [`EvolutionConfig`] gathers every tunable of a training run. It is passed to
//! [`PopulationManager::new`](crate::population::PopulationManager::new) once
//! and never changes afterwards. It (de)serializes with serde, so runs can be
//! described in JSON:
//!
//! ```
//! use lanevo_training::config::EvolutionConfig;
//!
//! let config: EvolutionConfig = serde_json::from_str(
//!     r#"{ "population_size": 40, "selection": { "kind": "tournament", "size": 3 } }"#,
//! )
//! .unwrap();
//! assert_eq!(config.population_size, 40);
//! config.validate().unwrap();
//! ```

use lanevo_engine::{Action, ObservationKind};
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    crossover::CrossoverKind,
    diversity::DEFAULT_SAMPLE_CAP,
    fitness::FitnessConfig,
    mutation::{MutationConfig, Perturbation},
    policy::{Activation, Architecture},
    selection::SelectionConfig,
};

/// Tolerance on the fitness weights summing to 1.
const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// How many of the best agents are carried over unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElitePolicy {
    /// A constant share of the population.
    Fixed { fraction: f32 },
    /// Interpolates from `max_fraction` at diversity 0 down to `min_fraction` at
    /// diversity 1: preserve gains when converged, explore when diverse.
    Adaptive { min_fraction: f32, max_fraction: f32 },
}

impl Default for ElitePolicy {
    fn default() -> Self {
        Self::Fixed { fraction: 0.2 }
    }
}

impl ElitePolicy {
    #[must_use]
    pub fn fraction(&self, diversity: f32) -> f32 {
        match *self {
            Self::Fixed { fraction } => fraction,
            Self::Adaptive {
                min_fraction,
                max_fraction,
            } => max_fraction - (max_fraction - min_fraction) * diversity.clamp(0.0, 1.0),
        }
    }

    /// Number of elites for a population of `population_size`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn count(&self, population_size: usize, diversity: f32) -> usize {
        let count = (self.fraction(diversity).clamp(0.0, 1.0) * population_size as f32).round();
        usize::min(count as usize, population_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub architecture: Architecture,
    pub activation: Activation,
    /// Observation layout the simulation feeds to policies.
    pub observation: ObservationKind,
    pub fitness: FitnessConfig,
    pub elite: ElitePolicy,
    pub mutation: MutationConfig,
    pub crossover: CrossoverKind,
    pub selection: SelectionConfig,
    /// Upper bound on genomes compared by the diversity estimate.
    pub diversity_sample_cap: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            architecture: Architecture::default(),
            activation: Activation::default(),
            observation: ObservationKind::default(),
            fitness: FitnessConfig::default(),
            elite: ElitePolicy::default(),
            mutation: MutationConfig::default(),
            crossover: CrossoverKind::default(),
            selection: SelectionConfig::default(),
            diversity_sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}

impl EvolutionConfig {
    /// Checks that the configuration describes a runnable experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        let Architecture {
            input_nodes,
            hidden_nodes,
            output_nodes,
        } = self.architecture;
        if input_nodes != self.observation.len() {
            return Err(ConfigError::Architecture {
                layer: "input",
                expected: self.observation.len(),
                actual: input_nodes,
            });
        }
        if output_nodes != Action::COUNT {
            return Err(ConfigError::Architecture {
                layer: "output",
                expected: Action::COUNT,
                actual: output_nodes,
            });
        }
        if hidden_nodes == 0 {
            return Err(ConfigError::NoHiddenNodes);
        }

        let weights = &self.fitness.weights;
        if !weights.all_non_negative() || (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::FitnessWeights {
                sum: weights.sum(),
            });
        }

        match self.elite {
            ElitePolicy::Fixed { fraction } => check_unit("elite fraction", fraction)?,
            ElitePolicy::Adaptive {
                min_fraction,
                max_fraction,
            } => {
                check_unit("elite min_fraction", min_fraction)?;
                check_unit("elite max_fraction", max_fraction)?;
                if min_fraction > max_fraction {
                    return Err(ConfigError::Parameter {
                        name: "elite min_fraction (above max_fraction)",
                        value: min_fraction,
                    });
                }
            }
        }

        check_unit("mutation rate", self.mutation.rate)?;
        if !(self.mutation.bound > 0.0) {
            return Err(ConfigError::Parameter {
                name: "mutation bound",
                value: self.mutation.bound,
            });
        }
        let (name, width) = match self.mutation.perturbation {
            Perturbation::Uniform { half_width } => ("mutation half_width", half_width),
            Perturbation::Gaussian { sigma } => ("mutation sigma", sigma),
        };
        if !(width >= 0.0 && width.is_finite()) {
            return Err(ConfigError::Parameter { name, value: width });
        }

        self.selection.build()?;
        Ok(())
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Parameter { name, value })
    }
}
