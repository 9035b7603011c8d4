//! Populations and the generation transition.
//!
//! # Lifecycle
//!
//! ```text
//! Evaluating ──(last agent dies)──▶ AllDead ──PopulationManager::advance──▶ Evaluating
//!                                              (breeding)
//! ```
//!
//! A [`Population`] keeps alive agents and retired ones apart; an agent moves to
//! the retired set the tick it dies and never comes back. Once every agent is
//! retired, [`PopulationManager::new_generation`] turns the dead set into the
//! next population:
//!
//! 1. An empty dead set yields a fresh random population
//! 2. Fitness is evaluated and normalized over the dead set
//! 3. Diversity is estimated from a sample of the dead genomes
//! 4. Agents are ranked by fitness and an elite count is chosen
//! 5. Elite brains are carried over unchanged into new agents
//! 6. Parents are selected, crossed over and mutated until the population is full
//!
//! Only brains cross the generation boundary; agents and their statistics do not.

use std::mem;

use lanevo_engine::EpisodeStats;
use lanevo_stats::descriptive::DescriptiveStats;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, GenerationError,
    agent::{Agent, AgentOrigin},
    config::EvolutionConfig,
    crossover,
    diversity::DiversityEstimator,
    fitness::FitnessEvaluator,
    genome::{self, Genome},
    mutation,
    selection::SelectionStrategy,
};

/// Where a population is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PopulationState {
    /// At least one agent is still playing.
    Evaluating,
    /// Every agent has been retired; ready for breeding.
    AllDead,
}

/// The agents of one generation.
#[derive(Debug, Clone)]
pub struct Population {
    generation: usize,
    alive: Vec<Agent>,
    dead: Vec<Agent>,
}

impl Population {
    /// Creates a population; agents that are already dead are retired immediately.
    #[must_use]
    pub fn new(generation: usize, agents: Vec<Agent>) -> Self {
        let mut this = Self {
            generation,
            alive: agents,
            dead: Vec::new(),
        };
        this.retire_dead();
        this
    }

    /// Zero-based generation index.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Total number of agents, alive or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.len() + self.dead.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn alive(&self) -> &[Agent] {
        &self.alive
    }

    pub fn alive_mut(&mut self) -> &mut [Agent] {
        &mut self.alive
    }

    /// Retired agents in the order they died.
    #[must_use]
    pub fn dead(&self) -> &[Agent] {
        &self.dead
    }

    #[must_use]
    pub fn state(&self) -> PopulationState {
        if self.alive.is_empty() {
            PopulationState::AllDead
        } else {
            PopulationState::Evaluating
        }
    }

    /// Moves every agent that is no longer alive to the retired set.
    pub fn retire_dead(&mut self) {
        let (alive, dead): (Vec<_>, Vec<_>) =
            mem::take(&mut self.alive).into_iter().partition(Agent::is_alive);
        self.alive = alive;
        self.dead.extend(dead);
    }

    /// Retires every remaining agent, keeping its statistics.
    pub fn retire_all(&mut self) {
        for agent in &mut self.alive {
            agent.retire();
        }
        self.dead.append(&mut self.alive);
    }

    /// Consumes the population, returning every agent (alive ones retired first).
    #[must_use]
    pub fn into_dead(mut self) -> Vec<Agent> {
        self.retire_all();
        self.dead
    }
}

/// What happened during one generation transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Index of the generation that was bred from.
    pub generation: usize,
    /// `true` when the dead set was empty and a random population was created.
    pub bootstrapped: bool,
    pub diversity: f32,
    pub elite_count: usize,
    /// Normalized fitness of the dead population.
    pub fitness: Option<DescriptiveStats>,
    pub best_raw_fitness: f32,
    /// Episode statistics of the fittest agent.
    pub best_stats: Option<EpisodeStats>,
}

/// Owns the evolutionary configuration and performs generation transitions.
#[derive(Debug)]
pub struct PopulationManager {
    config: EvolutionConfig,
    fitness: FitnessEvaluator,
    diversity: DiversityEstimator,
    selection: Box<dyn SelectionStrategy>,
    generation: usize,
    last_summary: Option<GenerationSummary>,
}

impl PopulationManager {
    /// Creates a manager using the selection strategy named in `config`.
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selection = config.selection.build()?;
        Self::with_selection(config, selection)
    }

    /// Creates a manager with a caller-supplied selection strategy.
    ///
    /// `config.selection` is still validated but otherwise ignored.
    pub fn with_selection(
        config: EvolutionConfig,
        selection: Box<dyn SelectionStrategy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            fitness: FitnessEvaluator::new(config.fitness),
            diversity: DiversityEstimator::new(config.diversity_sample_cap),
            selection,
            generation: 0,
            last_summary: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Index of the generation currently being evaluated.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Summary of the most recent [`Self::new_generation`] call.
    #[must_use]
    pub fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }

    /// Creates `population_size` agents with random brains.
    pub fn bootstrap<R>(&self, rng: &mut R) -> Vec<Agent>
    where
        R: Rng + ?Sized,
    {
        (0..self.config.population_size)
            .map(|_| Agent::random(rng, self.config.architecture, self.config.activation))
            .collect()
    }

    /// Creates the first population of a run.
    pub fn initial_population<R>(&self, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        Population::new(self.generation, self.bootstrap(rng))
    }

    /// Breeds the next population from a finished one.
    ///
    /// Agents still alive are retired with their current statistics.
    pub fn advance<R>(
        &mut self,
        population: Population,
        rng: &mut R,
    ) -> Result<Population, GenerationError>
    where
        R: Rng,
    {
        let agents = self.new_generation(population.into_dead(), rng)?;
        Ok(Population::new(self.generation, agents))
    }

    /// Produces exactly `population_size` new agents from the dead population.
    ///
    /// # Errors
    ///
    /// Fails if selection finds no candidates or the dead agents' brains do not
    /// share one architecture.
    pub fn new_generation<R>(
        &mut self,
        mut dead: Vec<Agent>,
        rng: &mut R,
    ) -> Result<Vec<Agent>, GenerationError>
    where
        R: Rng,
    {
        let size = self.config.population_size;
        if dead.is_empty() {
            self.finish_generation(GenerationSummary {
                generation: self.generation,
                bootstrapped: true,
                diversity: 1.0,
                elite_count: 0,
                fitness: None,
                best_raw_fitness: 0.0,
                best_stats: None,
            });
            return Ok(self.bootstrap(rng));
        }

        let raw = self.fitness.evaluate(&mut dead);
        let genomes = dead.iter().map(|a| genome::encode(a.brain())).collect::<Vec<Genome>>();
        let diversity = self.diversity.estimate(&genomes, rng);

        let mut ranked = dead.into_iter().zip(raw).collect::<Vec<_>>();
        ranked.sort_by(|(a, _), (b, _)| b.fitness().total_cmp(&a.fitness()));
        let best_raw_fitness = ranked.first().map_or(0.0, |(_, raw)| *raw);
        let dead = ranked.into_iter().map(|(agent, _)| agent).collect::<Vec<_>>();

        let elite_count = usize::min(self.config.elite.count(size, diversity), dead.len());
        let mut next = Vec::with_capacity(size);
        next.extend(
            dead[..elite_count]
                .iter()
                .map(|agent| Agent::new(agent.brain().clone(), AgentOrigin::Elite)),
        );

        while next.len() < size {
            let a = self.selection.select(&dead, rng)?;
            let b = self.selection.select(&dead, rng)?;
            let mut child = crossover::crossover(
                &genome::encode(a.brain()),
                &genome::encode(b.brain()),
                self.config.crossover,
                rng,
            )?;
            mutation::mutate(&mut child, &self.config.mutation, diversity, rng);
            let brain = genome::decode(&child, self.config.architecture)?
                .with_activation(self.config.activation);
            next.push(Agent::new(brain, AgentOrigin::Offspring));
        }

        self.finish_generation(GenerationSummary {
            generation: self.generation,
            bootstrapped: false,
            diversity,
            elite_count,
            fitness: DescriptiveStats::new(dead.iter().map(Agent::fitness)),
            best_raw_fitness,
            best_stats: dead.first().map(|agent| *agent.stats()),
        });
        Ok(next)
    }

    fn finish_generation(&mut self, summary: GenerationSummary) {
        self.last_summary = Some(summary);
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        EmptyPopulationError, ShapeKind,
        config::ElitePolicy,
        policy::{Activation, Architecture, NeuralPolicy},
        selection::SelectionConfig,
    };

    fn config(population_size: usize) -> EvolutionConfig {
        EvolutionConfig {
            population_size,
            ..EvolutionConfig::default()
        }
    }

    fn dead_agents(rng: &mut Pcg32, scores: &[usize]) -> Vec<Agent> {
        scores
            .iter()
            .map(|&score| {
                let brain = NeuralPolicy::random(rng, Architecture::default(), Activation::Sigmoid);
                Agent::finished(
                    brain,
                    EpisodeStats {
                        score,
                        survival_time: 10 * score + 1,
                        obstacles_avoided: score / 10,
                        moves_made: score / 5,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_dead_set_bootstraps() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut manager = PopulationManager::new(config(25)).unwrap();
        let next = manager.new_generation(vec![], &mut rng).unwrap();
        assert_eq!(next.len(), 25);
        assert!(next.iter().all(|a| a.origin().is_random()));
        assert!(next.iter().all(Agent::is_alive));
        assert!(manager.last_summary().unwrap().bootstrapped);
        assert_eq!(manager.generation(), 1);
    }

    #[test]
    fn test_population_size_is_preserved() {
        let mut rng = Pcg32::seed_from_u64(1);
        for dead_count in [1, 3, 10, 40] {
            let mut manager = PopulationManager::new(config(10)).unwrap();
            let scores = (0..dead_count).collect::<Vec<_>>();
            let next = manager
                .new_generation(dead_agents(&mut rng, &scores), &mut rng)
                .unwrap();
            assert_eq!(next.len(), 10, "dead_count = {dead_count}");
        }
    }

    #[test]
    fn test_elites_are_best_brains_unchanged() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut manager = PopulationManager::new(EvolutionConfig {
            elite: ElitePolicy::Fixed { fraction: 0.2 },
            ..config(10)
        })
        .unwrap();
        let dead = dead_agents(&mut rng, &[5, 90, 40, 0, 70, 10, 20, 30, 60, 50]);
        let best = dead[1].brain().clone();
        let second = dead[4].brain().clone();

        let next = manager.new_generation(dead, &mut rng).unwrap();
        assert_eq!(next[0].origin(), AgentOrigin::Elite);
        assert_eq!(next[0].brain(), &best);
        assert_eq!(next[1].brain(), &second);
        assert!(next[2..].iter().all(|a| a.origin().is_offspring()));
        assert!(next.iter().all(|a| *a.stats() == EpisodeStats::new()));

        let summary = manager.last_summary().unwrap();
        assert_eq!(summary.elite_count, 2);
        assert_eq!(summary.best_stats.unwrap().score, 90);
        assert!((0.0..=1.0).contains(&summary.diversity));
    }

    #[test]
    fn test_offspring_share_architecture() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut manager = PopulationManager::new(EvolutionConfig {
            selection: SelectionConfig::Tournament { size: 3 },
            activation: Activation::Tanh,
            ..config(12)
        })
        .unwrap();
        let next = manager
            .new_generation(dead_agents(&mut rng, &[1, 2, 3, 4]), &mut rng)
            .unwrap();
        for agent in &next {
            assert_eq!(agent.brain().architecture(), Architecture::default());
        }
        assert!(
            next.iter()
                .filter(|a| a.origin().is_offspring())
                .all(|a| a.brain().activation() == Activation::Tanh)
        );
    }

    #[test]
    fn test_mixed_architectures_fail() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut manager = PopulationManager::new(EvolutionConfig {
            elite: ElitePolicy::Fixed { fraction: 0.0 },
            selection: SelectionConfig::Tournament { size: 1 },
            ..config(4)
        })
        .unwrap();
        let mut dead = dead_agents(&mut rng, &[1]);
        dead.push(Agent::finished(
            NeuralPolicy::random(&mut rng, Architecture::new(8, 4, 3), Activation::Sigmoid),
            EpisodeStats::new(),
        ));
        let err = loop {
            // a generation bred only from the first agent succeeds
            match manager.new_generation(dead.clone(), &mut rng) {
                Ok(_) => {}
                Err(err) => break err,
            }
        };
        assert!(matches!(
            err,
            GenerationError::Shape(e) if e.kind == ShapeKind::Genome
        ));
    }

    #[test]
    fn test_empty_selection_is_fatal() {
        #[derive(Debug)]
        struct Never;
        impl SelectionStrategy for Never {
            fn select<'a>(
                &self,
                _agents: &'a [Agent],
                _rng: &mut dyn rand::RngCore,
            ) -> Result<&'a Agent, EmptyPopulationError> {
                Err(EmptyPopulationError)
            }
        }

        let mut rng = Pcg32::seed_from_u64(5);
        let mut manager = PopulationManager::with_selection(
            EvolutionConfig {
                elite: ElitePolicy::Fixed { fraction: 0.0 },
                ..config(4)
            },
            Box::new(Never),
        )
        .unwrap();
        assert_eq!(
            manager
                .new_generation(dead_agents(&mut rng, &[1, 2]), &mut rng)
                .unwrap_err(),
            GenerationError::EmptyPopulation(EmptyPopulationError)
        );
    }

    #[test]
    fn test_population_lifecycle() {
        let mut rng = Pcg32::seed_from_u64(6);
        let manager = PopulationManager::new(config(5)).unwrap();
        let mut population = manager.initial_population(&mut rng);
        assert_eq!(population.state(), PopulationState::Evaluating);
        assert_eq!(population.alive().len(), 5);

        population.alive_mut()[2].retire();
        population.retire_dead();
        assert_eq!(population.alive().len(), 4);
        assert_eq!(population.dead().len(), 1);
        assert!(population.state().is_evaluating());

        population.retire_all();
        assert!(population.state().is_all_dead());
        assert_eq!(population.len(), 5);
    }

    #[test]
    fn test_advance_numbers_generations() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut manager = PopulationManager::new(config(6)).unwrap();
        let population = manager.initial_population(&mut rng);
        assert_eq!(population.generation(), 0);
        let population = manager.advance(population, &mut rng).unwrap();
        assert_eq!(population.generation(), 1);
        assert_eq!(population.len(), 6);
        assert!(population.state().is_evaluating());
    }

    #[test]
    fn test_invalid_temperature_is_a_config_error() {
        for temperature in [0.0, -0.5, f32::NAN] {
            let result = PopulationManager::new(EvolutionConfig {
                selection: SelectionConfig::Nucleus {
                    temperature,
                    top_p: 0.9,
                },
                ..config(10)
            });
            assert!(matches!(
                result,
                Err(ConfigError::Parameter {
                    name: "selection temperature",
                    ..
                })
            ));
        }
    }
}
