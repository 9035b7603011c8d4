//! Parent selection.
//!
//! Two interchangeable strategies implement [`SelectionStrategy`]:
//!
//! ## Nucleus Sampling
//!
//! Fitness is turned into probabilities, sharpened or flattened by a
//! temperature exponent `1 / temperature`, and restricted to the smallest
//! highest-probability set whose mass reaches `top_p`. One agent is drawn from
//! that set in proportion to its (renormalized) probability. Degenerate
//! distributions (total fitness or total scaled probability of zero) fall back
//! to a uniform draw over the whole population.
//!
//! ## Tournament Selection
//!
//! `size` agents are drawn uniformly (without replacement when the population
//! is large enough, with replacement otherwise) and the fittest wins. Larger
//! tournaments mean stronger selection pressure.

use std::fmt;

use rand::{
    RngCore,
    distr::{Distribution as _, weighted::WeightedIndex},
    seq::IndexedRandom as _,
};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, EmptyPopulationError, agent::Agent};

/// Picks one parent from a population whose fitness has been evaluated.
pub trait SelectionStrategy: fmt::Debug + Send + Sync {
    /// Returns a member of `agents`.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyPopulationError`] if `agents` is empty.
    fn select<'a>(
        &self,
        agents: &'a [Agent],
        rng: &mut dyn RngCore,
    ) -> Result<&'a Agent, EmptyPopulationError>;
}

/// Temperature-scaled top-p sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NucleusSelection {
    temperature: f32,
    top_p: f32,
}

impl NucleusSelection {
    /// # Arguments
    ///
    /// * `temperature` - Must be positive and finite; below 1 sharpens, above 1 flattens
    /// * `top_p` - Probability mass of the nucleus, in `(0, 1]`
    pub fn new(temperature: f32, top_p: f32) -> Result<Self, ConfigError> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(ConfigError::Parameter {
                name: "selection temperature",
                value: temperature,
            });
        }
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(ConfigError::Parameter {
                name: "selection top_p",
                value: top_p,
            });
        }
        Ok(Self { temperature, top_p })
    }

    /// Indices of the nucleus and their scaled weights, or `None` if the
    /// distribution is degenerate.
    fn nucleus(&self, agents: &[Agent]) -> Option<Vec<(usize, f32)>> {
        let total = agents.iter().map(|a| a.fitness().max(0.0)).sum::<f32>();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }
        let exponent = 1.0 / self.temperature;
        let scaled = agents
            .iter()
            .map(|a| (a.fitness().max(0.0) / total).powf(exponent))
            .collect::<Vec<_>>();
        let scaled_total = scaled.iter().sum::<f32>();
        if !(scaled_total > 0.0 && scaled_total.is_finite()) {
            return None;
        }

        let mut order = (0..agents.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| scaled[b].total_cmp(&scaled[a]));

        let mut nucleus = Vec::new();
        let mut mass = 0.0;
        for i in order {
            nucleus.push((i, scaled[i]));
            mass += scaled[i] / scaled_total;
            if mass >= self.top_p {
                break;
            }
        }
        Some(nucleus)
    }
}

impl SelectionStrategy for NucleusSelection {
    fn select<'a>(
        &self,
        agents: &'a [Agent],
        rng: &mut dyn RngCore,
    ) -> Result<&'a Agent, EmptyPopulationError> {
        if agents.is_empty() {
            return Err(EmptyPopulationError);
        }
        let picked = self.nucleus(agents).and_then(|nucleus| {
            let dist = WeightedIndex::new(nucleus.iter().map(|(_, w)| *w)).ok()?;
            Some(nucleus[dist.sample(rng)].0)
        });
        match picked {
            Some(i) => Ok(&agents[i]),
            None => agents.choose(rng).ok_or(EmptyPopulationError),
        }
    }
}

/// Best-of-`size` tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelection {
    size: usize,
}

impl TournamentSelection {
    /// A size of 0 is treated as 1 (uniform random choice).
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select<'a>(
        &self,
        agents: &'a [Agent],
        rng: &mut dyn RngCore,
    ) -> Result<&'a Agent, EmptyPopulationError> {
        let size = self.size.max(1);
        let fittest = |a: &&Agent, b: &&Agent| a.fitness().total_cmp(&b.fitness());
        let winner = if agents.len() >= size {
            agents.choose_multiple(rng, size).max_by(fittest)
        } else {
            (0..size)
                .filter_map(|_| agents.choose(rng))
                .max_by(fittest)
        };
        winner.ok_or(EmptyPopulationError)
    }
}

/// Serializable choice of selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionConfig {
    Nucleus { temperature: f32, top_p: f32 },
    Tournament { size: usize },
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::Nucleus {
            temperature: 1.0,
            top_p: 0.9,
        }
    }
}

impl SelectionConfig {
    /// Builds the configured strategy.
    pub fn build(&self) -> Result<Box<dyn SelectionStrategy>, ConfigError> {
        match *self {
            Self::Nucleus { temperature, top_p } => {
                Ok(Box::new(NucleusSelection::new(temperature, top_p)?))
            }
            Self::Tournament { size: 0 } => Err(ConfigError::Parameter {
                name: "tournament size",
                value: 0.0,
            }),
            Self::Tournament { size } => Ok(Box::new(TournamentSelection::new(size))),
        }
    }
}
