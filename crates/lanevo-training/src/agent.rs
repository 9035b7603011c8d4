//! Agents: a policy plus the runner it steers.

use lanevo_engine::{Action, Course, EpisodeStats, ObservationKind, Runner};
use rand::Rng;

use crate::{
    ShapeError, ShapeKind,
    policy::{Activation, Architecture, NeuralPolicy},
};

/// How an agent's brain came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum AgentOrigin {
    /// Freshly initialized random brain.
    Random,
    /// Brain carried over unchanged from the previous generation.
    Elite,
    /// Brain bred by crossover and mutation.
    Offspring,
}

/// Coarse fitness band, used only for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FitnessTier {
    Low,
    Mid,
    High,
}

impl FitnessTier {
    #[must_use]
    pub fn from_fitness(fitness: f32) -> Self {
        if fitness < 0.33 {
            Self::Low
        } else if fitness < 0.66 {
            Self::Mid
        } else {
            Self::High
        }
    }
}

/// One member of a population.
///
/// The brain is fixed for the agent's lifetime. Episode statistics live in the
/// [`Runner`] and are only advanced by the simulation; the evolutionary
/// components read them but never write them. `fitness` is filled in by
/// [`FitnessEvaluator::evaluate`](crate::fitness::FitnessEvaluator::evaluate)
/// after the episode ends.
#[derive(Debug, Clone)]
pub struct Agent {
    brain: NeuralPolicy,
    runner: Runner,
    fitness: f32,
    origin: AgentOrigin,
}

impl Agent {
    /// Creates an agent at the start of an episode.
    #[must_use]
    pub fn new(brain: NeuralPolicy, origin: AgentOrigin) -> Self {
        Self {
            brain,
            runner: Runner::new(),
            fitness: 0.0,
            origin,
        }
    }

    /// Creates an agent with a random brain.
    pub fn random<R>(rng: &mut R, architecture: Architecture, activation: Activation) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(
            NeuralPolicy::random(rng, architecture, activation),
            AgentOrigin::Random,
        )
    }

    /// Creates a dead agent whose episode ended with `stats`.
    #[must_use]
    pub fn finished(brain: NeuralPolicy, stats: EpisodeStats) -> Self {
        Self {
            brain,
            runner: Runner::finished(stats),
            fitness: 0.0,
            origin: AgentOrigin::Random,
        }
    }

    #[must_use]
    pub fn brain(&self) -> &NeuralPolicy {
        &self.brain
    }

    #[must_use]
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    #[must_use]
    pub fn stats(&self) -> &EpisodeStats {
        self.runner.stats()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.runner.is_alive()
    }

    /// Normalized fitness from the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    #[must_use]
    pub fn origin(&self) -> AgentOrigin {
        self.origin
    }

    #[must_use]
    pub fn tier(&self) -> FitnessTier {
        FitnessTier::from_fitness(self.fitness)
    }

    /// Retires the agent without a collision.
    pub fn retire(&mut self) {
        self.runner.retire();
    }

    /// Asks the brain for an action given the current course.
    pub fn think(&self, course: &Course, observation: ObservationKind) -> Result<Action, ShapeError> {
        let input = self.runner.observe(course, observation);
        let index = self.brain.predict(&input)?;
        Action::from_index(index).ok_or(ShapeError {
            kind: ShapeKind::Output,
            expected: Action::COUNT,
            actual: self.brain.architecture().output_nodes,
        })
    }

    /// Plays one tick: observe, act, then let the runner move and check collision.
    ///
    /// Returns whether the agent is still alive.
    pub fn play_tick(
        &mut self,
        course: &Course,
        observation: ObservationKind,
    ) -> Result<bool, ShapeError> {
        if !self.is_alive() {
            return Ok(false);
        }
        let action = self.think(course, observation)?;
        Ok(self.runner.step(course, action))
    }
}
