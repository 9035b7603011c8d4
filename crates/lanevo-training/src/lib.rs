//! Neuroevolution of lane-dodging policies.
//!
//! This crate evolves fixed-topology feedforward networks that steer runners
//! on a [`lanevo_engine::Course`]. It is a generational genetic algorithm: every
//! agent of a population plays the same course until it collides, and the dead
//! population is then bred into the next one.
//!
//! # How a Generation Works
//!
//! 1. **Evaluating** - [`episode::Episode`] ticks the course; each alive agent's
//!    [`policy::NeuralPolicy`] maps its observation to an action
//! 2. **All dead** - Once every agent has collided (or the tick limit is hit) the
//!    population is handed to [`population::PopulationManager`]
//! 3. **Fitness** - [`fitness::FitnessEvaluator`] scores each agent from its episode
//!    statistics and normalizes the scores into a distribution
//! 4. **Diversity** - [`diversity::DiversityEstimator`] measures genome spread on a
//!    bounded sample
//! 5. **Elitism** - The best brains are carried over unchanged
//! 6. **Breeding** - Parents picked by a [`selection::SelectionStrategy`] are combined
//!    by [`crossover`] and perturbed by [`mutation`] until the population is full
//!
//! # Architecture
//!
//! ```text
//! Course (lanevo-engine)
//!     ↓ observation
//! NeuralPolicy ──encode/decode── Genome
//!     ↓ action                      ↑ crossover, mutation
//! EpisodeStats                      │
//!     ↓                             │
//! FitnessEvaluator → SelectionStrategy
//!                         ↑
//!               DiversityEstimator (adapts elitism and mutation)
//! ```
//!
//! # Example
//!
//! ```
//! use lanevo_engine::Course;
//! use lanevo_training::{config::EvolutionConfig, episode::Episode, population::PopulationManager};
//! use rand::{SeedableRng as _, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let config = EvolutionConfig {
//!     population_size: 10,
//!     ..EvolutionConfig::default()
//! };
//! let mut manager = PopulationManager::new(config).unwrap();
//! let mut population = manager.initial_population(&mut rng);
//!
//! for _ in 0..3 {
//!     let mut episode = Episode::new(Course::with_seed(1), config.observation, Some(500));
//!     episode.run(&mut population).unwrap();
//!     population = manager.advance(population, &mut rng).unwrap();
//!     assert_eq!(population.len(), 10);
//! }
//! ```
//!
//! # Randomness
//!
//! Every operation that needs randomness takes the generator as an argument.
//! Seeding one generator at start-up makes a whole run reproducible.

pub mod agent;
pub mod config;
pub mod crossover;
pub mod diversity;
pub mod episode;
pub mod fitness;
pub mod genome;
pub mod mutation;
pub mod policy;
pub mod population;
pub mod selection;

/// Which vector a [`ShapeError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ShapeKind {
    #[display("observation")]
    Observation,
    #[display("genome")]
    Genome,
    #[display("policy output")]
    Output,
}

/// A vector whose length does not match the network architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{kind} length mismatch: expected {expected}, got {actual}")]
pub struct ShapeError {
    pub kind: ShapeKind,
    pub expected: usize,
    pub actual: usize,
}

/// Two policies that cannot be bred because their node counts differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("policies have incompatible architectures: {left} vs {right}")]
pub struct IncompatibleArchitectureError {
    pub left: policy::Architecture,
    pub right: policy::Architecture,
}

/// Selection was asked to pick from no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot select from an empty population")]
pub struct EmptyPopulationError;

/// Failure while breeding a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum GenerationError {
    #[display("{_0}")]
    EmptyPopulation(EmptyPopulationError),
    #[display("{_0}")]
    Shape(ShapeError),
    #[display("{_0}")]
    IncompatibleArchitecture(IncompatibleArchitectureError),
}

/// An [`EvolutionConfig`](config::EvolutionConfig) that cannot be run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("network has {actual} {layer} nodes, expected {expected}")]
    Architecture {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("network must have at least one hidden node")]
    NoHiddenNodes,
    #[display("invalid {name}: {value}")]
    Parameter { name: &'static str, value: f32 },
    #[display("fitness weights must be non-negative and sum to 1 (sum is {sum})")]
    FitnessWeights { sum: f32 },
}
