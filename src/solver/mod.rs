//! Island assembly and the sequential-impulse velocity/position passes.
//!
//! Bodies integrate position exactly once per step, globally, between the
//! velocity and position passes — not per island — since a static or
//! kinematic body can be a "wall" in more than one island at once and must
//! not have its transform advanced twice. See [`crate::world::World::step`].

mod island;
mod position;
mod velocity;

pub use island::{build_islands, Island};
pub use position::solve_position_pass;
pub use velocity::solve_velocity_pass;
