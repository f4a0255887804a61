//! Convex shapes, bounding boxes and mass properties.

mod aabb;
mod mass;
mod shape;

pub use aabb::Aabb;
pub use mass::{Mass, MassType};
pub use shape::{Shape, MAX_POLYGON_VERTICES};
