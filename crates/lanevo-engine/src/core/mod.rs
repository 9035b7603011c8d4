//! Geometry and action primitives shared by the course and its runners.

pub use self::{action::*, lane::*, rect::*};

mod action;
mod lane;
mod rect;
