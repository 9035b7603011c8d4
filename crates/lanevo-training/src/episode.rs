//! Running a population on a course.

use lanevo_engine::{Course, ObservationKind};

use crate::{
    ShapeError,
    population::{Population, PopulationState},
};

/// One course shared by every agent of a population.
#[derive(Debug, Clone)]
pub struct Episode {
    course: Course,
    observation: ObservationKind,
    tick_limit: Option<usize>,
}

impl Episode {
    /// Creates an episode.
    ///
    /// # Arguments
    ///
    /// * `course` - Course the agents play on
    /// * `observation` - Observation layout fed to every brain
    /// * `tick_limit` - Agents still alive after this many ticks are retired
    #[must_use]
    pub fn new(course: Course, observation: ObservationKind, tick_limit: Option<usize>) -> Self {
        Self {
            course,
            observation,
            tick_limit,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Number of ticks played so far.
    #[must_use]
    pub fn ticks(&self) -> usize {
        self.course.ticks()
    }

    /// Advances the course by one tick and lets every alive agent act.
    ///
    /// Agents that collide are retired before this returns.
    pub fn tick(&mut self, population: &mut Population) -> Result<PopulationState, ShapeError> {
        let lead_score = population
            .alive()
            .iter()
            .map(|agent| agent.stats().score)
            .max()
            .unwrap_or(0);
        self.course.advance(lead_score);

        for agent in population.alive_mut() {
            agent.play_tick(&self.course, self.observation)?;
        }
        population.retire_dead();
        Ok(population.state())
    }

    /// Ticks until every agent is dead or the tick limit is reached.
    ///
    /// Returns the number of ticks played.
    pub fn run(&mut self, population: &mut Population) -> Result<usize, ShapeError> {
        let start = self.ticks();
        while population.state().is_evaluating() {
            if self.tick_limit.is_some_and(|limit| self.ticks() - start >= limit) {
                population.retire_all();
                break;
            }
            self.tick(population)?;
        }
        Ok(self.ticks() - start)
    }
}
