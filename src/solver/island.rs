use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use crate::body::Body;
use crate::constraint::{ContactConstraint, Joint};
use crate::geometry::MassType;
use crate::handle::BodyHandle;

/// A connected component of bodies reached through non-sensor contacts and
/// joints, solved independently of every other island in the same step.
///
/// Static/kinematic bodies act as walls: they're recorded in every island
/// that touches them but never traversed through, so the same static body
/// can legitimately appear in more than one island on the same step.
#[derive(Debug, Clone, Default)]
pub struct Island {
    pub bodies: Vec<BodyHandle>,
    pub contacts: Vec<usize>,
    pub joints: Vec<usize>,
}

enum Edge {
    Contact(usize, BodyHandle),
    Joint(usize, BodyHandle),
}

/// Partition the world into islands by depth-first search over contact and
/// joint edges, seeded from every body that is awake, enabled, and not
/// infinite-mass.
pub fn build_islands(
    bodies: &SlotMap<BodyHandle, Body>,
    contacts: &[ContactConstraint],
    joints: &[Joint],
) -> Vec<Island> {
    let mut edges: HashMap<BodyHandle, Vec<Edge>> = HashMap::new();
    for (index, contact) in contacts.iter().enumerate() {
        if contact.is_sensor {
            continue;
        }
        edges
            .entry(contact.body_a)
            .or_default()
            .push(Edge::Contact(index, contact.body_b));
        edges
            .entry(contact.body_b)
            .or_default()
            .push(Edge::Contact(index, contact.body_a));
    }
    for (index, joint) in joints.iter().enumerate() {
        edges
            .entry(joint.body_a)
            .or_default()
            .push(Edge::Joint(index, joint.body_b));
        edges
            .entry(joint.body_b)
            .or_default()
            .push(Edge::Joint(index, joint.body_a));
    }

    let is_seed = |body: &Body| body.mass_type() != MassType::Infinite && body.is_enabled() && !body.is_at_rest();

    let mut global_visited: HashSet<BodyHandle> = HashSet::new();
    let mut islands = Vec::new();

    for (handle, body) in bodies.iter() {
        if global_visited.contains(&handle) || !is_seed(body) {
            continue;
        }

        let mut island = Island::default();
        let mut local_visited: HashSet<BodyHandle> = HashSet::new();
        let mut contact_set: HashSet<usize> = HashSet::new();
        let mut joint_set: HashSet<usize> = HashSet::new();
        let mut stack = vec![handle];
        local_visited.insert(handle);

        while let Some(current) = stack.pop() {
            island.bodies.push(current);
            let current_body = &bodies[current];
            if current_body.mass_type() == MassType::Infinite {
                // A wall: recorded but not traversed through.
                continue;
            }
            global_visited.insert(current);

            let Some(current_edges) = edges.get(&current) else {
                continue;
            };
            for edge in current_edges {
                let other = match edge {
                    Edge::Contact(index, other) => {
                        contact_set.insert(*index);
                        *other
                    }
                    Edge::Joint(index, other) => {
                        joint_set.insert(*index);
                        *other
                    }
                };
                if local_visited.insert(other) {
                    stack.push(other);
                }
            }
        }

        island.contacts = contact_set.into_iter().collect();
        island.joints = joint_set.into_iter().collect();
        island.contacts.sort_unstable();
        island.joints.sort_unstable();
        islands.push(island);
    }

    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyBuilder;
    use crate::geometry::Shape;
    use crate::handle::FixtureHandle;
    use crate::math::{Transform, Vector2};

    fn dynamic_body(x: f64) -> Body {
        BodyBuilder::new()
            .position(Vector2::new(x, 0.0))
            .fixture(crate::body::FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0))
            .build()
            .unwrap()
    }

    fn static_body() -> Body {
        BodyBuilder::new().build().unwrap()
    }

    #[test]
    fn two_unconnected_dynamic_bodies_form_separate_islands() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        bodies.insert(dynamic_body(0.0));
        bodies.insert(dynamic_body(10.0));

        let islands = build_islands(&bodies, &[], &[]);
        assert_eq!(islands.len(), 2);
    }

    #[test]
    fn a_shared_static_body_appears_in_both_islands() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let ground = bodies.insert(static_body());
        let left = bodies.insert(dynamic_body(-2.0));
        let right = bodies.insert(dynamic_body(2.0));

        let contacts = vec![
            ContactConstraint::new(
                left,
                ground,
                FixtureHandle::new(left, 0),
                FixtureHandle::new(ground, 0),
                false,
                0.2,
                0.0,
                1.0,
            ),
            ContactConstraint::new(
                right,
                ground,
                FixtureHandle::new(right, 0),
                FixtureHandle::new(ground, 0),
                false,
                0.2,
                0.0,
                1.0,
            ),
        ];

        let islands = build_islands(&bodies, &contacts, &[]);
        assert_eq!(islands.len(), 2);
        assert!(islands.iter().all(|i| i.bodies.contains(&ground)));
    }

    #[test]
    fn two_dynamic_bodies_sharing_a_contact_form_one_island() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let a = bodies.insert(dynamic_body(0.0));
        let b = bodies.insert(dynamic_body(0.9));

        let contacts = vec![ContactConstraint::new(
            a,
            b,
            FixtureHandle::new(a, 0),
            FixtureHandle::new(b, 0),
            false,
            0.2,
            0.0,
            1.0,
        )];

        let islands = build_islands(&bodies, &contacts, &[]);
        assert_eq!(islands.len(), 1);
        assert_eq!(islands[0].contacts.len(), 1);
        let _ = Transform::identity();
    }

    #[test]
    fn at_rest_body_is_not_a_seed() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let mut b = dynamic_body(0.0);
        b.put_to_rest();
        bodies.insert(b);

        assert!(build_islands(&bodies, &[], &[]).is_empty());
    }
}
