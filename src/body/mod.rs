//! Rigid bodies and the fixtures attached to them.

mod body;
mod filter;
mod fixture;
mod force;

pub use body::{Body, BodyBuilder, BodyType};
pub use filter::Filter;
pub use fixture::{Fixture, FixtureDef};
