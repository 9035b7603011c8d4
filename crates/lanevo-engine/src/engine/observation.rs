use serde::{Deserialize, Serialize};

/// Lane reported when no obstacle is ahead of the runner.
pub const NO_OBSTACLE_LANE: f32 = -1.0;
/// Distance reported when no obstacle is ahead of the runner.
pub const NO_OBSTACLE_DISTANCE: f32 = 999.0;
/// How far ahead (in pixels) lane safety looks for danger.
pub const SAFETY_LOOK_AHEAD: i32 = 300;

/// Layout of the observation vector a runner produces each tick.
///
/// Both layouts start with the same five values:
///
/// | index | value                                                   |
/// |-------|---------------------------------------------------------|
/// | 0..3  | one-hot current lane                                    |
/// | 3     | lane of the nearest obstacle ahead, or `-1`             |
/// | 4     | distance to that obstacle, or `999`                     |
///
/// [`ObservationKind::LaneSafety`] appends the safety of the current, left and
/// right lane, each in `[0, 1]` (`0` = obstacle about to hit, `1` = clear within
/// [`SAFETY_LOOK_AHEAD`]; lanes off the course are `0`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    Basic,
    #[default]
    LaneSafety,
}

impl ObservationKind {
    /// Length of the observation vector (the required policy input width).
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Basic => 5,
            Self::LaneSafety => 8,
        }
    }
}
