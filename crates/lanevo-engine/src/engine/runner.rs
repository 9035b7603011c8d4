use std::collections::HashSet;

use crate::core::{Action, Lane, PLAYER_Y, Rect};

use super::{
    course::{Course, ObstacleId},
    episode_stats::EpisodeStats,
    observation::{NO_OBSTACLE_DISTANCE, NO_OBSTACLE_LANE, ObservationKind, SAFETY_LOOK_AHEAD},
};

/// One agent's presence on a [`Course`].
///
/// A runner starts in the centre lane with zeroed [`EpisodeStats`]. It is
/// retired permanently the first tick it collides with an obstacle; a dead
/// runner ignores further [`Self::step`] calls.
///
/// Passed obstacles are counted at most once per runner by remembering the
/// ids already counted. Ids of obstacles that have left the course are
/// forgotten so the set stays bounded by the number of obstacles on screen.
#[derive(Debug, Clone)]
pub struct Runner {
    lane: Lane,
    stats: EpisodeStats,
    alive: bool,
    counted: HashSet<ObstacleId>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lane: Lane::CENTER,
            stats: EpisodeStats::new(),
            alive: true,
            counted: HashSet::new(),
        }
    }

    /// Creates a dead runner whose episode ended with `stats`.
    ///
    /// Useful for scoring results recorded elsewhere.
    #[must_use]
    pub fn finished(stats: EpisodeStats) -> Self {
        Self {
            stats,
            alive: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    #[must_use]
    pub const fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::runner(self.lane)
    }

    /// Marks the runner dead without a collision (e.g. when an episode hits its tick limit).
    pub const fn retire(&mut self) {
        self.alive = false;
    }

    /// Builds the observation vector for the current tick.
    ///
    /// See [`ObservationKind`] for the layout.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn observe(&self, course: &Course, kind: ObservationKind) -> Vec<f32> {
        let mut observation = Vec::with_capacity(kind.len());
        observation.extend(Lane::ALL.map(|lane| if lane == self.lane { 1.0 } else { 0.0 }));

        let nearest = course
            .obstacles()
            .iter()
            .filter(|obstacle| obstacle.y() < PLAYER_Y)
            .max_by_key(|obstacle| obstacle.y());
        match nearest {
            Some(obstacle) => {
                observation.push(obstacle.lane().index() as f32);
                observation.push((PLAYER_Y - obstacle.y()) as f32);
            }
            None => {
                observation.push(NO_OBSTACLE_LANE);
                observation.push(NO_OBSTACLE_DISTANCE);
            }
        }

        if kind == ObservationKind::LaneSafety {
            observation.push(lane_safety(course, Some(self.lane)));
            observation.push(lane_safety(course, self.lane.shifted(-1)));
            observation.push(lane_safety(course, self.lane.shifted(1)));
        }
        debug_assert_eq!(observation.len(), kind.len());
        observation
    }

    /// Plays one tick on `course` with the chosen `action`.
    ///
    /// Moves the runner (moves off the course edge are ignored), counts newly
    /// passed obstacles, then checks for a collision. A runner that survives
    /// the tick gains survival time and has its score recomputed.
    ///
    /// Returns whether the runner is still alive.
    pub fn step(&mut self, course: &Course, action: Action) -> bool {
        if !self.alive {
            return false;
        }

        if let Some(lane) = self.lane.shifted(action.direction())
            && lane != self.lane
        {
            self.lane = lane;
            self.stats.record_move();
        }

        self.counted
            .retain(|id| course.obstacles().iter().any(|o| o.id() == *id));
        for obstacle in course.obstacles() {
            if obstacle.is_passed() && self.counted.insert(obstacle.id()) {
                self.stats.avoid_obstacle();
            }
        }

        let rect = self.rect();
        if course
            .obstacles()
            .iter()
            .any(|obstacle| rect.intersects(&obstacle.rect()))
        {
            self.alive = false;
            return false;
        }

        self.stats.survive_tick();
        true
    }
}

/// Safety of `lane` in `[0, 1]`; `None` (off the course) is `0`.
fn lane_safety(course: &Course, lane: Option<Lane>) -> f32 {
    let Some(lane) = lane else {
        return 0.0;
    };
    #[expect(clippy::cast_precision_loss)]
    let max_danger = course
        .obstacles()
        .iter()
        .filter(|obstacle| obstacle.lane() == lane)
        .map(|obstacle| PLAYER_Y - obstacle.y())
        .filter(|distance| 0 < *distance && *distance < SAFETY_LOOK_AHEAD)
        .map(|distance| (SAFETY_LOOK_AHEAD - distance) as f32 / SAFETY_LOOK_AHEAD as f32)
        .fold(0.0, f32::max);
    1.0 - max_danger
}
