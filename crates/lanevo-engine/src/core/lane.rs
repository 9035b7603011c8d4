/// Number of lanes on the course.
pub const LANE_COUNT: usize = 3;

/// Horizontal centre of each lane.
pub const LANE_X: [i32; LANE_COUNT] = [150, 450, 750];

pub const PLAYER_WIDTH: i32 = 50;
pub const PLAYER_HEIGHT: i32 = 50;
/// Top edge of every runner's box; runners only move horizontally.
pub const PLAYER_Y: i32 = 500;

pub const OBSTACLE_WIDTH: i32 = 150;
pub const OBSTACLE_HEIGHT: i32 = 20;

/// A lane index in `0..LANE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lane(u8);

impl Lane {
    pub const LEFT: Self = Self(0);
    pub const CENTER: Self = Self(1);
    pub const RIGHT: Self = Self(2);

    pub const ALL: [Self; LANE_COUNT] = [Self::LEFT, Self::CENTER, Self::RIGHT];

    /// Returns the lane at `index`, or `None` if it is off the course.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        (index < LANE_COUNT).then_some(Self(index as u8))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Horizontal centre of the lane.
    #[must_use]
    pub const fn x(self) -> i32 {
        LANE_X[self.0 as usize]
    }

    /// Returns the neighbouring lane in `direction` (-1 left, +1 right).
    ///
    /// Returns `None` when the move would leave the course.
    #[must_use]
    pub fn shifted(self, direction: i32) -> Option<Self> {
        let index = i32::from(self.0) + direction;
        usize::try_from(index).ok().and_then(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_stays_on_course() {
        assert_eq!(Lane::LEFT.shifted(-1), None);
        assert_eq!(Lane::LEFT.shifted(1), Some(Lane::CENTER));
        assert_eq!(Lane::CENTER.shifted(0), Some(Lane::CENTER));
        assert_eq!(Lane::RIGHT.shifted(1), None);
        assert_eq!(Lane::RIGHT.shifted(-1), Some(Lane::CENTER));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(Lane::new(2), Some(Lane::RIGHT));
        assert_eq!(Lane::new(LANE_COUNT), None);
    }
}
