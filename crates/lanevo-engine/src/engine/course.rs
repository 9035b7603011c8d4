use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::core::{LANE_COUNT, Lane, PLAYER_HEIGHT, PLAYER_Y, Rect};

use super::difficulty::DifficultyLevel;

/// Spawn timer value that must be exceeded before a new obstacle appears.
const SPAWN_TIMER_THRESHOLD: u32 = 80;
/// Top edge of a freshly spawned obstacle.
const SPAWN_Y: i32 = -50;
/// Obstacles whose next position would reach this line are removed.
const COURSE_BOTTOM: i32 = 650;

/// Identity of an obstacle, unique within one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(u64);

/// A falling obstacle occupying one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    id: ObstacleId,
    lane: Lane,
    y: i32,
}

impl Obstacle {
    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Top edge of the obstacle.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::obstacle(self.lane, self.y)
    }

    /// Returns `true` once the obstacle has fallen past the runners' line.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        self.y > PLAYER_Y + PLAYER_HEIGHT
    }
}

/// The shared obstacle stream all runners of a generation play on.
///
/// Difficulty is chosen each tick from the leading score passed to
/// [`Self::advance`], so the whole course speeds up as the best runner
/// scores. Obstacle lanes are drawn from a seeded generator, so two courses
/// built with the same seed and advanced with the same scores are identical.
#[derive(Debug, Clone)]
pub struct Course {
    rng: Pcg32,
    obstacles: Vec<Obstacle>,
    spawn_timer: u32,
    next_id: u64,
    ticks: usize,
}

impl Default for Course {
    fn default() -> Self {
        Self::new()
    }
}

impl Course {
    /// Creates an empty course with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible obstacle stream.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            obstacles: Vec::new(),
            spawn_timer: 0,
            next_id: 0,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Number of times [`Self::advance`] has been called.
    #[must_use]
    pub const fn ticks(&self) -> usize {
        self.ticks
    }

    /// Advances the course by one tick.
    ///
    /// Grows the spawn timer, spawns an obstacle in a random lane when the
    /// timer passes its threshold, then moves every obstacle down and drops
    /// the ones that leave the course.
    ///
    /// # Arguments
    ///
    /// * `lead_score` - Highest score among runners still alive
    pub fn advance(&mut self, lead_score: usize) {
        let level = DifficultyLevel::for_score(lead_score);
        self.ticks += 1;

        self.spawn_timer += level.spawn_increment;
        if self.spawn_timer > SPAWN_TIMER_THRESHOLD {
            let lane = Lane::ALL[self.rng.random_range(0..LANE_COUNT)];
            self.spawn(lane, SPAWN_Y);
            self.spawn_timer = 0;
        }

        self.obstacles.retain_mut(|obstacle| {
            obstacle.y += level.speed;
            obstacle.y < COURSE_BOTTOM
        });
    }

    /// Places an obstacle directly, bypassing the spawn timer.
    pub fn spawn(&mut self, lane: Lane, y: i32) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.obstacles.push(Obstacle { id, lane, y });
        id
    }
}
