use arrayvec::ArrayVec;

use crate::collision::{FeatureId, Manifold};
use crate::handle::{BodyHandle, FixtureHandle};
use crate::math::{Transform, Vector2};
use crate::settings::Settings;

/// Per-point solver state for one contact: the geometry is rebuilt every
/// step from the manifold, but accumulated impulses persist across steps to
/// enable warm-starting.
#[derive(Debug, Clone, Copy)]
pub struct ContactPoint {
    pub world_point: Vector2,
    pub depth: f64,
    pub feature: FeatureId,
    pub r_a: Vector2,
    pub r_b: Vector2,
    /// Contact point expressed in each body's local frame, fixed for the
    /// step: the position pass re-derives the current world point from
    /// these as bodies are nudged apart, without rebuilding the manifold.
    pub local_anchor_a: Vector2,
    pub local_anchor_b: Vector2,
    pub normal_mass: f64,
    pub tangent_mass: f64,
    pub velocity_bias: f64,
    pub normal_impulse: f64,
    pub tangent_impulse: f64,
}

/// Lifecycle state reported to `ContactListener` and used by the contact
/// manager to decide whether to emit begin/persist/end events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactLifecycle {
    Added,
    Persisted,
    Removed,
}

/// The normal + friction rows for one overlapping fixture pair.
///
/// Rebuilt from a fresh collision response every step, but carries
/// separate accumulated normal/tangent impulses per point across steps so
/// the velocity pass can warm-start instead of solving from zero.
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub fixture_a: FixtureHandle,
    pub fixture_b: FixtureHandle,
    pub is_sensor: bool,
    pub friction: f64,
    pub restitution: f64,
    pub restitution_threshold: f64,
    pub normal: Vector2,
    pub points: ArrayVec<ContactPoint, 2>,
}

impl ContactConstraint {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        is_sensor: bool,
        friction: f64,
        restitution: f64,
        restitution_threshold: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            fixture_a,
            fixture_b,
            is_sensor,
            friction,
            restitution,
            restitution_threshold,
            normal: Vector2::new(1.0, 0.0),
            points: ArrayVec::new(),
        }
    }

    /// Rebuild contact points from a fresh manifold, matching against the
    /// previous points by feature id to carry over accumulated impulses for
    /// warm-starting. Returns which points were newly added vs. persisted,
    /// in manifold order.
    pub fn update(
        &mut self,
        manifold: &Manifold,
        transform_a: &Transform,
        transform_b: &Transform,
        world_center_a: Vector2,
        world_center_b: Vector2,
        settings: &Settings,
    ) -> ArrayVec<ContactLifecycle, 2> {
        let previous = self.points.clone();
        self.normal = manifold.normal;
        self.points.clear();

        let mut lifecycle = ArrayVec::new();

        for mp in &manifold.points {
            let old = previous.iter().find(|p| p.feature == mp.feature);

            let (normal_impulse, tangent_impulse, was_persisted) = match old {
                Some(old) if settings.warm_starting_enabled => {
                    let moved = old.world_point.distance(mp.world_point);
                    if moved <= settings.max_warm_start_distance {
                        (old.normal_impulse, old.tangent_impulse, true)
                    } else {
                        (0.0, 0.0, false)
                    }
                }
                _ => (0.0, 0.0, old.is_some()),
            };

            lifecycle.push(if was_persisted {
                ContactLifecycle::Persisted
            } else {
                ContactLifecycle::Added
            });

            let r_a = mp.world_point - world_center_a;
            let r_b = mp.world_point - world_center_b;

            self.points.push(ContactPoint {
                world_point: mp.world_point,
                depth: mp.depth,
                feature: mp.feature,
                r_a,
                r_b,
                local_anchor_a: transform_a.apply_inverse(mp.world_point),
                local_anchor_b: transform_b.apply_inverse(mp.world_point),
                normal_mass: 0.0,
                tangent_mass: 0.0,
                velocity_bias: 0.0,
                normal_impulse,
                tangent_impulse,
            });
        }

        lifecycle
    }
}
