use super::lane::{
    Lane, OBSTACLE_HEIGHT, OBSTACLE_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH, PLAYER_Y,
};

/// Axis-aligned collision box in course coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of a runner standing in `lane`.
    #[must_use]
    pub const fn runner(lane: Lane) -> Self {
        Self::new(
            lane.x() - PLAYER_WIDTH / 2,
            PLAYER_Y,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }

    /// Box of an obstacle in `lane` whose top edge is at `y`.
    #[must_use]
    pub const fn obstacle(lane: Lane, y: i32) -> Self {
        Self::new(
            lane.x() - OBSTACLE_WIDTH / 2,
            y,
            OBSTACLE_WIDTH,
            OBSTACLE_HEIGHT,
        )
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns `true` if the two boxes overlap. Touching edges do not count.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_lane_overlap() {
        let runner = Rect::runner(Lane::CENTER);
        assert!(runner.intersects(&Rect::obstacle(Lane::CENTER, PLAYER_Y - 10)));
        assert!(runner.intersects(&Rect::obstacle(Lane::CENTER, PLAYER_Y + 40)));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let runner = Rect::runner(Lane::CENTER);
        let above = Rect::obstacle(Lane::CENTER, PLAYER_Y - OBSTACLE_HEIGHT);
        let below = Rect::obstacle(Lane::CENTER, PLAYER_Y + PLAYER_HEIGHT);
        assert!(!runner.intersects(&above));
        assert!(!runner.intersects(&below));
    }

    #[test]
    fn test_neighbouring_lanes_never_collide() {
        let runner = Rect::runner(Lane::LEFT);
        assert!(!runner.intersects(&Rect::obstacle(Lane::CENTER, PLAYER_Y)));
    }
}
