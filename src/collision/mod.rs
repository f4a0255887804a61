//! Broad-phase, narrow-phase and manifold construction.

pub mod broadphase;
pub mod manifold;
pub mod narrowphase;
pub mod toi;

pub use broadphase::BroadPhase;
pub use manifold::{FeatureId, Manifold, ManifoldPoint};
pub use narrowphase::Overlap;
pub use toi::Toi;
