//! 2D rigid-body physics simulation core.
//!
//! Advances a population of rigid bodies under external forces, resolves
//! non-penetration and friction at contacts, and enforces bilateral
//! constraints (joints). Rendering, input, and persistence are left to the
//! consumer; this crate only runs [`World::step`].

pub mod body;
pub mod collision;
pub mod constraint;
pub mod contact_manager;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod listener;
pub mod math;
pub mod settings;
pub mod solver;
pub mod world;

pub use body::{Body, BodyBuilder, Fixture, FixtureDef};
pub use error::PhysicsError;
pub use handle::{BodyHandle, JointHandle};
pub use math::{Rotation, Transform, Vector2};
pub use settings::{CcdMode, Settings};
pub use world::{StepReport, World};
