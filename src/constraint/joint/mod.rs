//! Bilateral constraints between two bodies (or a body and the world).

mod kind;

pub use kind::JointKind;

use crate::handle::BodyHandle;
use crate::math::Vector2;

/// A joint: two body references (one may be the world/"ground"), whether
/// the connected bodies should still collide with each other, and its
/// type-specific parameters plus in-solver state.
///
/// Each variant carries its own Jacobian-derived effective mass and
/// accumulated impulse rather than sharing one scalar lambda.
#[derive(Debug, Clone)]
pub struct Joint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub collide_connected: bool,
    pub kind: JointKind,
}

impl Joint {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, kind: JointKind) -> Self {
        Self {
            body_a,
            body_b,
            collide_connected: false,
            kind,
        }
    }

    pub fn collide_connected(mut self, collide_connected: bool) -> Self {
        self.collide_connected = collide_connected;
        self
    }
}

/// The two bodies' state a joint needs to compute its Jacobian: world
/// position of the anchor, center of mass, velocities and inverse
/// mass/inertia. Gathered by the solver from the body store so joint code
/// never touches the store directly.
#[derive(Debug, Clone, Copy)]
pub struct JointBodyState {
    pub center: Vector2,
    pub linear_velocity: Vector2,
    pub angular_velocity: f64,
    pub inv_mass: f64,
    pub inv_inertia: f64,
}
