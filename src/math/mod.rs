//! Minimal linear algebra: a 2D vector, a drift-free rotation, and the
//! rigid transform built from them.
//!
//! `Rotation` stores a sin/cos pair so repeated composition never
//! re-derives `atan2` every frame. Built on `vek::Vec2<f64>` for the
//! underlying arithmetic rather than hand-rolling component-wise ops.

mod rotation;
mod transform;
mod vector;

pub use rotation::Rotation;
pub use transform::Transform;
pub use vector::Vector2;
