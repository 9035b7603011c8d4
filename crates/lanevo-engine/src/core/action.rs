/// Discrete action a policy emits once per tick.
///
/// The index order matches the output layer of a policy network: output `0`
/// moves left, `1` stays, `2` moves right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant,
)]
pub enum Action {
    #[display("left")]
    MoveLeft,
    #[display("stay")]
    Stay,
    #[display("right")]
    MoveRight,
}

impl Action {
    /// Number of distinct actions (the required policy output width).
    pub const COUNT: usize = 3;

    pub const ALL: [Self; Self::COUNT] = [Self::MoveLeft, Self::Stay, Self::MoveRight];

    /// Maps a policy output index to an action.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lane offset requested by this action.
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::MoveLeft => -1,
            Self::Stay => 0,
            Self::MoveRight => 1,
        }
    }
}
