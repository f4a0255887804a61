//! Observer interfaces notified synchronously during [`crate::world::World::step`].
//!
//! Listeners are passed by reference and are forbidden from structurally
//! mutating the world mid-step; a veto is a typed `bool` return rather
//! than an out-parameter. Every method has a no-op default so a consumer
//! only implements what it needs.

use crate::handle::{BodyHandle, FixtureHandle, JointHandle};

/// Vetoes or accepts a candidate fixture pair before narrow-phase runs.
pub trait CollisionListener {
    fn should_collide(&mut self, fixture_a: FixtureHandle, fixture_b: FixtureHandle) -> bool {
        let _ = (fixture_a, fixture_b);
        true
    }
}

/// Notified of contact begin/persist/end transitions and post-solve impulses.
pub trait ContactListener {
    fn begin(&mut self, fixture_a: FixtureHandle, fixture_b: FixtureHandle) {
        let _ = (fixture_a, fixture_b);
    }

    /// Reported once per step for a non-sensor constraint that already
    /// existed and is still touched, after its points have been rebuilt
    /// from this step's manifold.
    fn persist(&mut self, fixture_a: FixtureHandle, fixture_b: FixtureHandle) {
        let _ = (fixture_a, fixture_b);
    }

    fn end(&mut self, fixture_a: FixtureHandle, fixture_b: FixtureHandle) {
        let _ = (fixture_a, fixture_b);
    }

    /// Reported once per solved contact point per step, after the velocity
    /// pass has finished iterating.
    fn post_solve(&mut self, fixture_a: FixtureHandle, fixture_b: FixtureHandle, normal_impulse: f64, tangent_impulse: f64) {
        let _ = (fixture_a, fixture_b, normal_impulse, tangent_impulse);
    }
}

/// Notified at the start and end of every `step` call.
pub trait StepListener {
    fn begin(&mut self, dt: f64) {
        let _ = dt;
    }

    fn end(&mut self, dt: f64) {
        let _ = dt;
    }

    /// A body's position or velocity became non-finite during this step. The
    /// body has already been disabled by the time this fires.
    fn diverged(&mut self, body: BodyHandle) {
        let _ = body;
    }
}

/// Notified when a body's AABB leaves the world bounds.
pub trait BoundsListener {
    fn outside(&mut self, body: BodyHandle);
}

/// Notified when a body or joint is removed, including joints destroyed as
/// a cascade of removing one of their bodies.
pub trait DestructionListener {
    fn body_destroyed(&mut self, body: BodyHandle) {
        let _ = body;
    }

    fn joint_destroyed(&mut self, joint: JointHandle) {
        let _ = joint;
    }
}
