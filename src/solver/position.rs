use std::collections::HashMap;

use slotmap::SlotMap;

use crate::body::Body;
use crate::constraint::ContactConstraint;
use crate::handle::BodyHandle;
use crate::math::{Rotation, Transform, Vector2};
use crate::settings::Settings;

use super::island::Island;

/// Per-body working state for the Baumgarte/NGS position pass: the world
/// center and orientation are nudged directly, then converted back to a
/// `Transform` once at the end, mirroring [`crate::constraint::JointBodyState`]
/// but for position rather than velocity.
#[derive(Debug, Clone, Copy)]
struct PositionState {
    center: Vector2,
    rotation: Rotation,
    local_center: Vector2,
    inv_mass: f64,
    inv_inertia: f64,
}

impl PositionState {
    fn transform(&self) -> Transform {
        Transform::new(self.center - self.rotation.rotate(self.local_center), self.rotation)
    }
}

/// Run the Baumgarte position-correction pass for one island's contacts,
/// terminating early once every point's penetration is within slop.
/// Joints carry their positional correction in their velocity-pass bias
/// instead (see [`crate::constraint::JointKind::solve_velocity`]), so they
/// have no separate position solve here.
///
/// Returns whether every contact converged within the iteration budget —
/// the caller aggregates this into the step's `ConvergenceShortfall` count.
pub fn solve_position_pass(
    island: &Island,
    bodies: &mut SlotMap<BodyHandle, Body>,
    contacts: &mut [ContactConstraint],
    settings: &Settings,
) -> bool {
    let mut index_of: HashMap<BodyHandle, usize> = HashMap::with_capacity(island.bodies.len());
    let mut states: Vec<PositionState> = Vec::with_capacity(island.bodies.len());
    for &handle in &island.bodies {
        let body = &bodies[handle];
        index_of.insert(handle, states.len());
        states.push(PositionState {
            center: body.world_center(),
            rotation: body.transform().rotation,
            local_center: body.mass().center,
            inv_mass: body.mass().inv_mass,
            inv_inertia: body.mass().inv_inertia,
        });
    }

    let mut converged = island.contacts.is_empty();
    for _ in 0..settings.position_iterations {
        let mut worst_separation = 0.0f64;
        for &contact_index in &island.contacts {
            let contact = &contacts[contact_index];
            let ia = index_of[&contact.body_a];
            let ib = index_of[&contact.body_b];
            let separation = solve_contact_position(contact, &mut states, ia, ib, settings);
            worst_separation = worst_separation.min(separation);
        }
        if worst_separation > -settings.linear_slop * 3.0 {
            converged = true;
            break;
        }
    }

    for &handle in &island.bodies {
        let state = states[index_of[&handle]];
        bodies[handle].apply_solved_transform(state.transform());
    }

    converged
}

fn index_two_mut<T>(slice: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i != j, "a contact cannot reference the same body twice");
    if i < j {
        let (left, right) = slice.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Correct one contact's points in place; returns the most negative (worst)
/// separation observed before correction, for the caller's convergence check.
fn solve_contact_position(
    contact: &ContactConstraint,
    states: &mut [PositionState],
    ia: usize,
    ib: usize,
    settings: &Settings,
) -> f64 {
    let normal = contact.normal;
    let mut worst = 0.0f64;

    for point in &contact.points {
        let (a, b) = index_two_mut(states, ia, ib);
        let transform_a = a.transform();
        let transform_b = b.transform();
        let world_a = transform_a.apply(point.local_anchor_a);
        let world_b = transform_b.apply(point.local_anchor_b);

        // Negative when still penetrating, by how much; zero or positive
        // once separated. At contact-build time this equals `-depth`.
        let separation = (world_b - world_a).dot(normal) - point.depth;
        worst = worst.min(separation);

        let corrected = (separation + settings.linear_slop).clamp(-settings.max_linear_correction, 0.0);
        if corrected >= 0.0 {
            continue;
        }
        let bias = -settings.baumgarte * corrected;

        let r_a = world_a - a.center;
        let r_b = world_b - b.center;
        let rn_a = r_a.cross(normal);
        let rn_b = r_b.cross(normal);
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
        if k <= 0.0 {
            continue;
        }
        let impulse = bias / k;
        let p = normal * impulse;

        a.center = a.center - p * a.inv_mass;
        a.rotation = (a.rotation + (-a.inv_inertia * r_a.cross(p))).normalize();
        b.center = b.center + p * b.inv_mass;
        b.rotation = (b.rotation + (b.inv_inertia * r_b.cross(p))).normalize();
    }

    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyBuilder, FixtureDef};
    use crate::collision::{FeatureId, Manifold, ManifoldPoint};
    use crate::geometry::Shape;
    use crate::handle::FixtureHandle;
    use crate::solver::island::{build_islands, Island};

    #[test]
    fn overlapping_bodies_are_pushed_apart_toward_non_penetration() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let floor = bodies.insert(
            BodyBuilder::new()
                .fixture(FixtureDef::new(Shape::rectangle(5.0, 0.5).unwrap()))
                .build()
                .unwrap(),
        );
        let ball = bodies.insert(
            BodyBuilder::new()
                .position(Vector2::new(0.0, 0.4))
                .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0))
                .build()
                .unwrap(),
        );

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
        let mut points = arrayvec::ArrayVec::new();
        points.push(ManifoldPoint {
            world_point: Vector2::new(0.0, 0.0),
            depth: 0.1,
            feature: FeatureId::VertexVertex(0, 0),
        });
        let manifold = Manifold {
            // Normal points body_a (ball, above) -> body_b (floor, below).
            normal: Vector2::new(0.0, -1.0),
            points,
        };
        contact.update(
            &manifold,
            &bodies[ball].transform(),
            &bodies[floor].transform(),
            bodies[ball].world_center(),
            bodies[floor].world_center(),
            &Settings::default(),
        );

        let settings = Settings::default();
        let mut contacts = vec![contact];
        let island = Island {
            bodies: vec![ball, floor],
            contacts: vec![0],
            joints: Vec::new(),
        };
        let _ = build_islands(&bodies, &contacts, &[]);

        let y_before = bodies[ball].position().y();
        solve_position_pass(&island, &mut bodies, &mut contacts, &settings);
        assert!(bodies[ball].position().y() > y_before);
    }
}
