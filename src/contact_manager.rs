//! Tracks live contact constraints across steps, keyed by unordered fixture
//! pair.
//!
//! Every step, candidate pairs come from the broad-phase, get filtered by
//! collision group/mask and by joints that opt out of `collide_connected`,
//! then narrow-phase plus manifold build decide
//! whether a constraint is created, updated (carrying its warm-start
//! impulses forward by feature id inside [`ContactConstraint::update`]) or
//! torn down. Fixtures are fixed for a body's lifetime (see
//! [`crate::handle::FixtureHandle`]), so broad-phase registration happens
//! once per body rather than per fixture add/remove.

use std::collections::{HashMap, HashSet};

use slotmap::{Key, SlotMap};

use crate::body::Body;
use crate::collision::{manifold, BroadPhase};
use crate::constraint::{ContactConstraint, Joint};
use crate::geometry::Shape;
use crate::handle::{BodyHandle, FixtureHandle};
use crate::listener::CollisionListener;
use crate::math::Transform;
use crate::settings::Settings;

/// A fixture pair's contact lifecycle transition, reported to a
/// [`crate::listener::ContactListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Begin {
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        is_sensor: bool,
    },
    Persist {
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
    },
    End {
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        is_sensor: bool,
    },
}

/// Owns the broad-phase index and the live [`ContactConstraint`] set.
pub struct ContactManager {
    broadphase: BroadPhase,
    constraints: HashMap<(FixtureHandle, FixtureHandle), ContactConstraint>,
}

impl ContactManager {
    pub fn new(broadphase_margin: f64) -> Self {
        Self {
            broadphase: BroadPhase::new(broadphase_margin),
            constraints: HashMap::new(),
        }
    }

    pub fn broadphase(&self) -> &BroadPhase {
        &self.broadphase
    }

    /// Register every fixture of a newly added body with the broad-phase.
    pub fn add_body(&mut self, handle: BodyHandle, body: &Body) {
        for (index, fixture) in body.fixtures().iter().enumerate() {
            let fixture_handle = FixtureHandle::new(handle, index);
            self.broadphase.insert(fixture_handle, fixture.shape.aabb(&body.transform()));
        }
    }

    /// Drop a body's fixtures from the broad-phase and any constraints that
    /// referenced them.
    pub fn remove_body(&mut self, handle: BodyHandle, fixture_count: usize) {
        for index in 0..fixture_count {
            let fixture_handle = FixtureHandle::new(handle, index);
            self.broadphase.remove(fixture_handle);
        }
        self.constraints.retain(|&(a, b), _| a.body != handle && b.body != handle);
    }

    /// Re-fatten every fixture's AABB for a body that moved during the
    /// previous step's position integration.
    pub fn synchronize_body(&mut self, handle: BodyHandle, body: &Body) {
        let transform = body.transform();
        for (index, fixture) in body.fixtures().iter().enumerate() {
            let fixture_handle = FixtureHandle::new(handle, index);
            self.broadphase.r#move(fixture_handle, fixture.shape.aabb(&transform));
        }
    }

    /// Live non-sensor constraints, for island assembly and the solver.
    pub fn solid_constraints(&self) -> impl Iterator<Item = &ContactConstraint> {
        self.constraints.values().filter(|c| !c.is_sensor)
    }

    /// Pull every non-sensor constraint out into an indexable `Vec` for one
    /// step's solve, paired with the keys needed to put them back.
    /// [`Island`](crate::solver::Island) contact indices refer to positions
    /// in the returned `Vec`, not the map.
    pub fn take_solid_constraints(&mut self) -> (Vec<(FixtureHandle, FixtureHandle)>, Vec<ContactConstraint>) {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        for (&key, constraint) in &self.constraints {
            if !constraint.is_sensor {
                keys.push(key);
                values.push(constraint.clone());
            }
        }
        (keys, values)
    }

    /// Write solved constraints back so their accumulated impulses warm-start
    /// the next step.
    pub fn restore_constraints(&mut self, keys: Vec<(FixtureHandle, FixtureHandle)>, values: Vec<ContactConstraint>) {
        for (key, value) in keys.into_iter().zip(values) {
            self.constraints.insert(key, value);
        }
    }

    /// Rebuild live constraints from the current broad-phase pairs, running
    /// the collision filter, an optional veto listener, narrow-phase and
    /// manifold build for each. Returns begin/persist/end events for a
    /// `ContactListener`.
    pub fn update(
        &mut self,
        bodies: &SlotMap<BodyHandle, Body>,
        joints: &[Joint],
        settings: &Settings,
        mut collision_listener: Option<&mut dyn CollisionListener>,
    ) -> Vec<ContactEvent> {
        let no_collide = non_colliding_pairs(joints);
        let mut touched: HashSet<(FixtureHandle, FixtureHandle)> = HashSet::new();
        let mut events = Vec::new();

        for (fixture_a, fixture_b) in self.broadphase.candidate_pairs() {
            if fixture_a.body == fixture_b.body {
                continue;
            }
            if no_collide.contains(&order_bodies(fixture_a.body, fixture_b.body)) {
                continue;
            }

            let body_a = &bodies[fixture_a.body];
            let body_b = &bodies[fixture_b.body];
            if !body_a.is_enabled() || !body_b.is_enabled() {
                continue;
            }

            let fa = &body_a.fixtures()[fixture_a.fixture];
            let fb = &body_b.fixtures()[fixture_b.fixture];
            if !fa.filter.should_collide(&fb.filter) {
                continue;
            }
            if let Some(listener) = collision_listener.as_deref_mut() {
                if !listener.should_collide(fixture_a, fixture_b) {
                    continue;
                }
            }

            let transform_a = body_a.transform();
            let transform_b = body_b.transform();
            let built = manifold::build(&fa.shape, &transform_a, &fb.shape, &transform_b, settings);
            let key = (fixture_a, fixture_b);
            let is_sensor = fa.is_sensor || fb.is_sensor;

            let Some(m) = built else {
                if let Some(existing) = self.constraints.remove(&key) {
                    events.push(ContactEvent::End { fixture_a, fixture_b, is_sensor: existing.is_sensor });
                }
                continue;
            };
            touched.insert(key);

            if is_sensor {
                if !self.constraints.contains_key(&key) {
                    events.push(ContactEvent::Begin { fixture_a, fixture_b, is_sensor: true });
                    self.constraints.insert(
                        key,
                        ContactConstraint::new(fixture_a.body, fixture_b.body, fixture_a, fixture_b, true, 0.0, 0.0, 0.0),
                    );
                }
                continue;
            }

            let friction = (fa.friction * fb.friction).sqrt();
            let restitution = fa.restitution.max(fb.restitution);
            let restitution_threshold = (fa.restitution_threshold + fb.restitution_threshold) * 0.5;
            let is_new = !self.constraints.contains_key(&key);

            let constraint = self.constraints.entry(key).or_insert_with(|| {
                ContactConstraint::new(fixture_a.body, fixture_b.body, fixture_a, fixture_b, false, friction, restitution, restitution_threshold)
            });
            constraint.friction = friction;
            constraint.restitution = restitution;
            constraint.restitution_threshold = restitution_threshold;
            let lifecycle = constraint.update(
                &m,
                &transform_a,
                &transform_b,
                body_a.world_center(),
                body_b.world_center(),
                settings,
            );

            if is_new {
                events.push(ContactEvent::Begin { fixture_a, fixture_b, is_sensor: false });
            } else if !lifecycle.is_empty() {
                events.push(ContactEvent::Persist { fixture_a, fixture_b });
            }
        }

        // Pairs whose fat AABBs stopped overlapping drop out of
        // `candidate_pairs` entirely rather than resolving to `None` above,
        // so they need a separate sweep to be torn down.
        let stale: Vec<_> = self
            .constraints
            .keys()
            .filter(|key| !touched.contains(*key))
            .copied()
            .collect();
        for key in stale {
            let still_candidate = self
                .broadphase
                .aabb(key.0)
                .zip(self.broadphase.aabb(key.1))
                .is_some_and(|(a, b)| a.overlaps(&b));
            if !still_candidate {
                if let Some(existing) = self.constraints.remove(&key) {
                    events.push(ContactEvent::End {
                        fixture_a: key.0,
                        fixture_b: key.1,
                        is_sensor: existing.is_sensor,
                    });
                }
            }
        }

        events
    }
}

fn order_bodies(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a.data().as_ffi() <= b.data().as_ffi() {
        (a, b)
    } else {
        (b, a)
    }
}

fn non_colliding_pairs(joints: &[Joint]) -> HashSet<(BodyHandle, BodyHandle)> {
    joints
        .iter()
        .filter(|j| !j.collide_connected)
        .map(|j| order_bodies(j.body_a, j.body_b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyBuilder, FixtureDef};
    use crate::math::Vector2;

    fn circle_body(x: f64) -> Body {
        BodyBuilder::new()
            .position(Vector2::new(x, 0.0))
            .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0))
            .build()
            .unwrap()
    }

    #[test]
    fn overlapping_fixtures_produce_a_begin_event_then_an_end_event_once_separated() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let mut manager = ContactManager::new(0.1);
        let settings = Settings::default();

        let a = bodies.insert(circle_body(0.0));
        manager.add_body(a, &bodies[a]);
        let b = bodies.insert(circle_body(0.5));
        manager.add_body(b, &bodies[b]);

        let events = manager.update(&bodies, &[], &settings, None);
        assert!(events.iter().any(|e| matches!(e, ContactEvent::Begin { is_sensor: false, .. })));

        bodies[b].apply_solved_transform(Transform::from_translation(Vector2::new(50.0, 0.0)));
        manager.synchronize_body(b, &bodies[b]);
        let events = manager.update(&bodies, &[], &settings, None);
        assert!(events.iter().any(|e| matches!(e, ContactEvent::End { .. })));
    }

    #[test]
    fn a_contact_still_touching_on_the_next_step_emits_persist_not_another_begin() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let mut manager = ContactManager::new(0.1);
        let settings = Settings::default();

        let a = bodies.insert(circle_body(0.0));
        manager.add_body(a, &bodies[a]);
        let b = bodies.insert(circle_body(0.5));
        manager.add_body(b, &bodies[b]);

        let events = manager.update(&bodies, &[], &settings, None);
        assert!(events.iter().any(|e| matches!(e, ContactEvent::Begin { is_sensor: false, .. })));

        let events = manager.update(&bodies, &[], &settings, None);
        assert!(!events.iter().any(|e| matches!(e, ContactEvent::Begin { .. })));
        assert!(events.iter().any(|e| matches!(e, ContactEvent::Persist { .. })));
    }

    #[test]
    fn joint_without_collide_connected_suppresses_the_pair() {
        use crate::constraint::{Joint, JointKind};

        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let mut manager = ContactManager::new(0.1);
        let settings = Settings::default();

        let a = bodies.insert(circle_body(0.0));
        manager.add_body(a, &bodies[a]);
        let b = bodies.insert(circle_body(0.2));
        manager.add_body(b, &bodies[b]);

        let joint = Joint {
            body_a: a,
            body_b: b,
            collide_connected: false,
            kind: JointKind::Rope {
                anchor_a: Vector2::ZERO,
                anchor_b: Vector2::ZERO,
                max_length: 10.0,
                accumulated_impulse: 0.0,
            },
        };

        let events = manager.update(&bodies, &[joint], &settings, None);
        assert!(events.is_empty());
    }
}
