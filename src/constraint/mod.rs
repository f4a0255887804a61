//! Velocity constraints solved each step: contacts between overlapping
//! fixtures and joints between body pairs.

pub mod contact;
pub mod joint;

pub use contact::{ContactConstraint, ContactLifecycle, ContactPoint};
pub use joint::{Joint, JointBodyState, JointKind};
