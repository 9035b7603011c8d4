use serde::{Deserialize, Serialize};

/// Points awarded per obstacle avoided.
const OBSTACLE_BONUS: usize = 10;
/// Ticks of survival per point.
const TICKS_PER_POINT: usize = 10;

/// Statistics one runner accumulates during an episode.
///
/// Every field starts at zero and is only ever advanced by the simulation.
/// The score is derived from the other counters:
///
/// ```text
/// score = survival_time / 10 + obstacles_avoided * 10
/// ```
///
/// # Example
///
/// ```
/// use lanevo_engine::EpisodeStats;
///
/// let mut stats = EpisodeStats::new();
/// stats.avoid_obstacle();
/// for _ in 0..25 {
///     stats.survive_tick();
/// }
/// assert_eq!(stats.score, 12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub score: usize,
    /// Ticks survived.
    pub survival_time: usize,
    pub obstacles_avoided: usize,
    /// Lane changes actually performed (moves blocked by the course edge don't count).
    pub moves_made: usize,
}

impl EpisodeStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            survival_time: 0,
            obstacles_avoided: 0,
            moves_made: 0,
        }
    }

    pub const fn record_move(&mut self) {
        self.moves_made += 1;
    }

    pub const fn avoid_obstacle(&mut self) {
        self.obstacles_avoided += 1;
    }

    /// Advances survival time by one tick and recomputes the score.
    pub const fn survive_tick(&mut self) {
        self.survival_time += 1;
        self.score = self.survival_time / TICKS_PER_POINT + self.obstacles_avoided * OBSTACLE_BONUS;
    }
}
