//! Fitness scoring of finished episodes.
//!
//! # Formula
//!
//! Each metric is scaled by its population maximum, then blended:
//!
//! ```text
//! raw = w_score      · score / max(score)
//!     + w_obstacles  · obstacles_avoided / max(obstacles_avoided)
//!     + w_survival   · survival_time / max(survival_time)
//!     + w_efficiency · efficiency / max(efficiency)
//!
//! where:
//!   efficiency = obstacles_avoided / max(moves_made, 1)
//!   every max(...) over the population is floored at 1
//! ```
//!
//! With non-negative weights summing to 1 the raw fitness lies in `[0, 1]`.
//! The population is then normalized for selection, either into a probability
//! distribution ([`FitnessNormalization::Sum`]) or relative to the best agent
//! ([`FitnessNormalization::Max`]). A population whose raw fitness is all zero
//! gets a uniform distribution instead.

use lanevo_engine::EpisodeStats;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Blend weights of the fitness formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub score: f32,
    pub obstacles: f32,
    pub survival: f32,
    pub efficiency: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            score: 0.4,
            obstacles: 0.3,
            survival: 0.2,
            efficiency: 0.1,
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.score + self.obstacles + self.survival + self.efficiency
    }

    #[must_use]
    pub fn all_non_negative(&self) -> bool {
        [self.score, self.obstacles, self.survival, self.efficiency]
            .iter()
            .all(|w| *w >= 0.0)
    }
}

/// How raw fitness is turned into selection weights.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessNormalization {
    /// Divide by the population total; values sum to 1.
    #[default]
    Sum,
    /// Divide by the population maximum; the best agent gets 1.
    Max,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessConfig {
    #[serde(default)]
    pub weights: FitnessWeights,
    #[serde(default)]
    pub normalization: FitnessNormalization,
}

/// Scores a population of finished agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEvaluator {
    config: FitnessConfig,
}

impl FitnessEvaluator {
    #[must_use]
    pub fn new(config: FitnessConfig) -> Self {
        Self { config }
    }

    /// Computes raw (unnormalized) fitness for each entry of `stats`.
    #[must_use]
    pub fn raw_fitness(&self, stats: &[EpisodeStats]) -> Vec<f32> {
        #[expect(clippy::cast_precision_loss)]
        let as_f32 = |v: usize| v as f32;
        let efficiency = |s: &EpisodeStats| {
            as_f32(s.obstacles_avoided) / as_f32(usize::max(s.moves_made, 1))
        };

        let max_score = floored_max(stats.iter().map(|s| as_f32(s.score)));
        let max_obstacles = floored_max(stats.iter().map(|s| as_f32(s.obstacles_avoided)));
        let max_survival = floored_max(stats.iter().map(|s| as_f32(s.survival_time)));
        let max_efficiency = floored_max(stats.iter().map(efficiency));

        let w = &self.config.weights;
        stats
            .iter()
            .map(|s| {
                w.score * as_f32(s.score) / max_score
                    + w.obstacles * as_f32(s.obstacles_avoided) / max_obstacles
                    + w.survival * as_f32(s.survival_time) / max_survival
                    + w.efficiency * efficiency(s) / max_efficiency
            })
            .collect()
    }

    /// Normalizes raw fitness values for selection.
    ///
    /// Falls back to a uniform distribution when no value is positive.
    #[must_use]
    pub fn normalize(&self, raw: &[f32]) -> Vec<f32> {
        let denominator = match self.config.normalization {
            FitnessNormalization::Sum => raw.iter().sum::<f32>(),
            FitnessNormalization::Max => raw.iter().copied().fold(0.0, f32::max),
        };
        if denominator > 0.0 && denominator.is_finite() {
            raw.iter().map(|f| f / denominator).collect()
        } else {
            #[expect(clippy::cast_precision_loss)]
            let uniform = 1.0 / raw.len() as f32;
            vec![uniform; raw.len()]
        }
    }

    /// Scores every agent and stores its normalized fitness on it.
    ///
    /// Returns the raw fitness values in the same order as `agents`.
    pub fn evaluate(&self, agents: &mut [Agent]) -> Vec<f32> {
        let stats = agents.iter().map(|a| *a.stats()).collect::<Vec<_>>();
        let raw = self.raw_fitness(&stats);
        for (agent, fitness) in agents.iter_mut().zip(self.normalize(&raw)) {
            agent.set_fitness(fitness);
        }
        raw
    }
}

/// Largest value, never below 1, for use as a denominator.
fn floored_max(values: impl Iterator<Item = f32>) -> f32 {
    values.fold(1.0, f32::max)
}
