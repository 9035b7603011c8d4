//! Headless lane-dodging simulation.
//!
//! This crate is the environment that evolved policies play against. It has no
//! rendering and no frame pacing: a [`Course`] of falling obstacles is advanced
//! one tick at a time, and every [`Runner`] on it observes the course, takes an
//! [`Action`] and accumulates [`EpisodeStats`] until it collides.
//!
//! # Modules
//!
//! - [`core`] - Lane geometry, collision boxes and actions
//! - [`engine`] - Course, difficulty table, runners and observations
//!
//! # Example
//!
//! ```
//! use lanevo_engine::{Action, Course, ObservationKind, Runner};
//!
//! let mut course = Course::with_seed(7);
//! let mut runner = Runner::new();
//!
//! while runner.is_alive() && runner.stats().survival_time < 100 {
//!     course.advance(runner.stats().score);
//!     let observation = runner.observe(&course, ObservationKind::LaneSafety);
//!     assert_eq!(observation.len(), ObservationKind::LaneSafety.len());
//!     runner.step(&course, Action::Stay);
//! }
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
