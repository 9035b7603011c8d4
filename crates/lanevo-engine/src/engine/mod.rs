//! Course simulation and per-runner bookkeeping.
//!
//! - [`Course`] - Shared obstacle stream, advanced once per tick
//! - [`DifficultyLevel`] - Score-keyed speed and spawn-rate table
//! - [`Runner`] - One agent's lane, liveness and passed-obstacle tracking
//! - [`EpisodeStats`] - Statistics a runner accumulates during an episode
//! - [`ObservationKind`] - Layout of the observation vector fed to policies
//!
//! # Tick Order
//!
//! 1. [`Course::advance`] spawns, moves and culls obstacles
//! 2. Each alive runner builds an observation and its policy picks an [`Action`](crate::Action)
//! 3. [`Runner::step`] moves the runner, counts passed obstacles, checks collision
//!    and, if it survived, updates its score

pub use self::{course::*, difficulty::*, episode_stats::*, observation::*, runner::*};

mod course;
mod difficulty;
mod episode_stats;
mod observation;
mod runner;
