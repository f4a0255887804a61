use std::collections::HashMap;

use slotmap::SlotMap;

use crate::body::Body;
use crate::constraint::{ContactConstraint, Joint, JointBodyState};
use crate::handle::BodyHandle;
use crate::math::Vector2;
use crate::settings::Settings;

use super::island::Island;

/// Run the sequential-impulse velocity pass for one island: gather working
/// state for every body, reset joint impulse accumulators for the step,
/// warm-start contacts, then iterate joints and contacts (tangent before
/// normal, per point) before writing velocities back to the bodies.
///
/// Joints are solved ahead of contacts each iteration and are not
/// warm-started across steps the way contacts are:
/// [`crate::constraint::JointKind::reset_impulses`] is called once per
/// joint before the iteration loop starts.
pub fn solve_velocity_pass(
    island: &Island,
    bodies: &mut SlotMap<BodyHandle, Body>,
    contacts: &mut [ContactConstraint],
    joints: &mut [Joint],
    settings: &Settings,
    dt: f64,
) {
    let mut index_of: HashMap<BodyHandle, usize> = HashMap::with_capacity(island.bodies.len());
    let mut states: Vec<JointBodyState> = Vec::with_capacity(island.bodies.len());
    for &handle in &island.bodies {
        let body = &bodies[handle];
        index_of.insert(handle, states.len());
        states.push(JointBodyState {
            center: body.world_center(),
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
            inv_mass: body.mass().inv_mass,
            inv_inertia: body.mass().inv_inertia,
        });
    }

    for &joint_index in &island.joints {
        joints[joint_index].kind.reset_impulses();
    }

    for &contact_index in &island.contacts {
        prepare_contact(&mut contacts[contact_index], &states, &index_of, settings);
    }

    if settings.warm_starting_enabled {
        for &contact_index in &island.contacts {
            warm_start_contact(&mut contacts[contact_index], &mut states, &index_of);
        }
    }

    for _ in 0..settings.velocity_iterations {
        for &joint_index in &island.joints {
            let joint = &mut joints[joint_index];
            let ia = index_of[&joint.body_a];
            let ib = index_of[&joint.body_b];
            let (a, b) = index_two_mut(&mut states, ia, ib);
            joint.kind.solve_velocity(a, b, dt, settings);
        }

        for &contact_index in &island.contacts {
            let contact = &mut contacts[contact_index];
            let ia = index_of[&contact.body_a];
            let ib = index_of[&contact.body_b];
            solve_contact_tangent(contact, &mut states, ia, ib);
            solve_contact_normal(contact, &mut states, ia, ib);
        }
    }

    for &handle in &island.bodies {
        let state = &states[index_of[&handle]];
        bodies[handle].apply_solved_velocity(state.linear_velocity, state.angular_velocity);
    }
}

fn point_velocity(state: &JointBodyState, r: Vector2) -> Vector2 {
    state.linear_velocity + Vector2::cross_scalar(state.angular_velocity, r)
}

fn apply_point_impulse(state: &mut JointBodyState, r: Vector2, impulse: Vector2) {
    state.linear_velocity = state.linear_velocity + impulse * state.inv_mass;
    state.angular_velocity += state.inv_inertia * r.cross(impulse);
}

fn index_two_mut<T>(slice: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i != j, "a contact or joint cannot reference the same body twice");
    if i < j {
        let (left, right) = slice.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Effective masses and restitution bias, computed once per step before any
/// impulse (warm-start or iteration) has been applied.
fn prepare_contact(
    contact: &mut ContactConstraint,
    states: &[JointBodyState],
    index_of: &HashMap<BodyHandle, usize>,
    settings: &Settings,
) {
    let a = states[index_of[&contact.body_a]];
    let b = states[index_of[&contact.body_b]];
    let normal = contact.normal;
    let tangent = normal.perp();
    let restitution = contact.restitution;

    for point in &mut contact.points {
        let rn_a = point.r_a.cross(normal);
        let rn_b = point.r_b.cross(normal);
        let k_normal = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
        point.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

        let rt_a = point.r_a.cross(tangent);
        let rt_b = point.r_b.cross(tangent);
        let k_tangent = a.inv_mass + b.inv_mass + a.inv_inertia * rt_a * rt_a + b.inv_inertia * rt_b * rt_b;
        point.tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

        let rel_vel = point_velocity(&b, point.r_b) - point_velocity(&a, point.r_a);
        let vn = rel_vel.dot(normal);
        point.velocity_bias = if vn < -settings.restitution_velocity_threshold {
            -restitution * vn
        } else {
            0.0
        };
    }
}

fn warm_start_contact(contact: &mut ContactConstraint, states: &mut [JointBodyState], index_of: &HashMap<BodyHandle, usize>) {
    let ia = index_of[&contact.body_a];
    let ib = index_of[&contact.body_b];
    let normal = contact.normal;
    let tangent = normal.perp();

    for point in &contact.points {
        let impulse = normal * point.normal_impulse + tangent * point.tangent_impulse;
        let (a, b) = index_two_mut(states, ia, ib);
        apply_point_impulse(a, point.r_a, -impulse);
        apply_point_impulse(b, point.r_b, impulse);
    }
}

/// Friction row, solved before the normal row since its clamp bound depends
/// on the normal impulse accumulated so far.
fn solve_contact_tangent(contact: &mut ContactConstraint, states: &mut [JointBodyState], ia: usize, ib: usize) {
    let normal = contact.normal;
    let tangent = normal.perp();
    let friction = contact.friction;

    for point in &mut contact.points {
        let (a, b) = index_two_mut(states, ia, ib);
        let rel_vel = point_velocity(b, point.r_b) - point_velocity(a, point.r_a);
        let vt = rel_vel.dot(tangent);

        let lambda = -point.tangent_mass * vt;
        let max_friction = friction * point.normal_impulse;
        let old_impulse = point.tangent_impulse;
        let new_impulse = (old_impulse + lambda).clamp(-max_friction, max_friction);
        let delta = new_impulse - old_impulse;
        point.tangent_impulse = new_impulse;

        let impulse = tangent * delta;
        apply_point_impulse(a, point.r_a, -impulse);
        apply_point_impulse(b, point.r_b, impulse);
    }
}

fn solve_contact_normal(contact: &mut ContactConstraint, states: &mut [JointBodyState], ia: usize, ib: usize) {
    let normal = contact.normal;

    for point in &mut contact.points {
        let (a, b) = index_two_mut(states, ia, ib);
        let rel_vel = point_velocity(b, point.r_b) - point_velocity(a, point.r_a);
        let vn = rel_vel.dot(normal);

        let lambda = -point.normal_mass * (vn - point.velocity_bias);
        let old_impulse = point.normal_impulse;
        let new_impulse = (old_impulse + lambda).max(0.0);
        let delta = new_impulse - old_impulse;
        point.normal_impulse = new_impulse;

        let impulse = normal * delta;
        apply_point_impulse(a, point.r_a, -impulse);
        apply_point_impulse(b, point.r_b, impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyBuilder, FixtureDef};
    use crate::collision::{FeatureId, Manifold, ManifoldPoint};
    use crate::geometry::Shape;
    use crate::handle::FixtureHandle;
    use crate::math::Transform;
    use crate::solver::island::build_islands;

    fn falling_body(y: f64, vy: f64) -> Body {
        BodyBuilder::new()
            .position(Vector2::new(0.0, y))
            .linear_velocity(Vector2::new(0.0, vy))
            .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0))
            .build()
            .unwrap()
    }

    fn ground() -> Body {
        BodyBuilder::new()
            .fixture(FixtureDef::new(Shape::rectangle(5.0, 0.5).unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn resting_contact_keeps_normal_impulse_non_negative_and_friction_in_cone() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let floor = bodies.insert(ground());
        let ball = bodies.insert(falling_body(0.4, -2.0));

        let mut contact = ContactConstraint::new(
            ball,
            floor,
            FixtureHandle::new(ball, 0),
            FixtureHandle::new(floor, 0),
            false,
            0.5,
            0.0,
            1.0,
        );
        let manifold = Manifold {
            // Normal points body_a (ball, above) -> body_b (floor, below).
            normal: Vector2::new(0.0, -1.0),
            points: {
                let mut p = arrayvec::ArrayVec::new();
                p.push(ManifoldPoint {
                    world_point: Vector2::new(0.0, 0.0),
                    depth: 0.1,
                    feature: FeatureId::VertexVertex(0, 0),
                });
                p
            },
        };
        contact.update(
            &manifold,
            &Transform::identity(),
            &Transform::identity(),
            bodies[ball].world_center(),
            bodies[floor].world_center(),
            &Settings::default(),
        );

        let settings = Settings::default();
        let mut contacts = vec![contact];
        let mut joints: Vec<Joint> = Vec::new();
        let islands = build_islands(&bodies, &contacts, &joints);
        assert_eq!(islands.len(), 1);

        solve_velocity_pass(&islands[0], &mut bodies, &mut contacts, &mut joints, &settings, 1.0 / 60.0);

        let point = &contacts[0].points[0];
        assert!(point.normal_impulse >= 0.0);
        assert!(point.tangent_impulse.abs() <= contacts[0].friction * point.normal_impulse + 1e-9);
        assert!(bodies[ball].linear_velocity().y() > -2.0);
    }
}
