/// Speed and spawn rate of the course for a given score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyLevel {
    /// Minimum score at which this level applies.
    pub threshold: usize,
    /// Pixels every obstacle falls per tick.
    pub speed: i32,
    /// Amount the spawn timer grows per tick.
    pub spawn_increment: u32,
}

/// Difficulty levels in ascending threshold order.
pub const DIFFICULTY_LEVELS: [DifficultyLevel; 3] = [
    DifficultyLevel {
        threshold: 0,
        speed: 3,
        spawn_increment: 1,
    },
    DifficultyLevel {
        threshold: 100,
        speed: 5,
        spawn_increment: 3,
    },
    DifficultyLevel {
        threshold: 200,
        speed: 10,
        spawn_increment: 5,
    },
];

impl DifficultyLevel {
    /// Returns the highest level whose threshold `score` has reached.
    #[must_use]
    pub fn for_score(score: usize) -> Self {
        DIFFICULTY_LEVELS
            .iter()
            .rev()
            .find(|level| score >= level.threshold)
            .copied()
            .unwrap_or(DIFFICULTY_LEVELS[0])
    }
}
