//! The simulation entry point: owns bodies, joints and the contact manager,
//! and drives one fixed-size integration step at a time.
//!
//! The step pipeline follows canonical sequential-impulse ordering:
//! velocity integrates first, then the contact manager builds this step's
//! constraints from the *pre-integration* transforms, then islands are
//! assembled and solved, and position integrates once globally between the
//! velocity and position passes (see [`crate::solver`]). Building contacts
//! before moving anything means warm-starting always matches impulses to a
//! transform the solver has actually seen; see `DESIGN.md` for the full
//! rationale.

use slotmap::SlotMap;

use crate::body::{Body, Fixture};
use crate::collision::toi::{lerp_transform, time_of_impact};
use crate::collision::Toi;
use crate::constraint::Joint;
use crate::contact_manager::{ContactEvent, ContactManager};
use crate::error::{PhysicsError, PhysicsResult};
use crate::geometry::{Aabb, MassType, Shape};
use crate::handle::{BodyHandle, FixtureHandle, JointHandle};
use crate::listener::{BoundsListener, CollisionListener, ContactListener, DestructionListener, StepListener};
use crate::math::{Transform, Vector2};
use crate::settings::{CcdMode, Settings};
use crate::solver::{build_islands, solve_position_pass, solve_velocity_pass, Island};

/// Summary of one `step` call, returned so a caller can monitor solver
/// health without installing a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Number of islands whose position pass did not converge within
    /// `settings.position_iterations`.
    pub convergence_shortfall: usize,
    /// Number of bodies that crossed the at-rest time threshold this step.
    pub bodies_put_to_rest: usize,
}

/// One ray/fixture intersection, in the order `World::raycast` was asked
/// to report them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycast {
    pub fixture: FixtureHandle,
    pub point: Vector2,
    pub normal: Vector2,
    pub fraction: f64,
}

/// Owns the simulation state and advances it one step at a time.
pub struct World {
    bodies: SlotMap<BodyHandle, Body>,
    joints: SlotMap<JointHandle, Joint>,
    contact_manager: ContactManager,
    gravity: Vector2,
    bounds: Option<Aabb>,
    settings: Settings,
    stepping: bool,

    collision_listener: Option<Box<dyn CollisionListener>>,
    contact_listener: Option<Box<dyn ContactListener>>,
    step_listener: Option<Box<dyn StepListener>>,
    bounds_listener: Option<Box<dyn BoundsListener>>,
    destruction_listener: Option<Box<dyn DestructionListener>>,
}

impl World {
    pub fn new() -> Self {
        let settings = Settings::default();
        Self {
            bodies: SlotMap::with_key(),
            joints: SlotMap::with_key(),
            contact_manager: ContactManager::new(settings.broadphase_margin),
            gravity: Vector2::new(0.0, -9.81),
            bounds: None,
            settings,
            stepping: false,
            collision_listener: None,
            contact_listener: None,
            step_listener: None,
            bounds_listener: None,
            destruction_listener: None,
        }
    }

    pub fn gravity(&self) -> Vector2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.gravity = gravity;
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Option<Aabb>) {
        self.bounds = bounds;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn set_collision_listener(&mut self, listener: Option<Box<dyn CollisionListener>>) {
        self.collision_listener = listener;
    }

    pub fn set_contact_listener(&mut self, listener: Option<Box<dyn ContactListener>>) {
        self.contact_listener = listener;
    }

    pub fn set_step_listener(&mut self, listener: Option<Box<dyn StepListener>>) {
        self.step_listener = listener;
    }

    pub fn set_bounds_listener(&mut self, listener: Option<Box<dyn BoundsListener>>) {
        self.bounds_listener = listener;
    }

    pub fn set_destruction_listener(&mut self, listener: Option<Box<dyn DestructionListener>>) {
        self.destruction_listener = listener;
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }

    pub fn joints(&self) -> impl Iterator<Item = (JointHandle, &Joint)> {
        self.joints.iter()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutable access for between-step operations like `apply_force` or
    /// `set_linear_velocity`. Only called outside `step`, so it carries no
    /// `stepping` guard of its own.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle)
    }

    pub fn fixture(&self, handle: FixtureHandle) -> Option<&Fixture> {
        self.bodies.get(handle.body)?.fixtures().get(handle.fixture)
    }

    /// Add a body to the world, registering its fixtures with the
    /// broad-phase. Rejected while a step is in progress.
    pub fn add_body(&mut self, body: Body) -> PhysicsResult<BodyHandle> {
        if self.stepping {
            return Err(PhysicsError::InvalidState);
        }
        let handle = self.bodies.insert(body);
        self.contact_manager.add_body(handle, &self.bodies[handle]);
        Ok(handle)
    }

    /// Remove a body, cascading to any joint that referenced it.
    pub fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        if self.stepping {
            return Err(PhysicsError::InvalidState);
        }
        let Some(body) = self.bodies.get(handle) else {
            return Err(PhysicsError::invalid_argument("body handle not found"));
        };
        let fixture_count = body.fixtures().len();

        let dependent: Vec<JointHandle> = self
            .joints
            .iter()
            .filter(|(_, joint)| joint.body_a == handle || joint.body_b == handle)
            .map(|(joint_handle, _)| joint_handle)
            .collect();
        for joint_handle in dependent {
            self.joints.remove(joint_handle);
            if let Some(listener) = self.destruction_listener.as_deref_mut() {
                listener.joint_destroyed(joint_handle);
            }
        }

        self.contact_manager.remove_body(handle, fixture_count);
        self.bodies.remove(handle);
        if let Some(listener) = self.destruction_listener.as_deref_mut() {
            listener.body_destroyed(handle);
        }
        Ok(())
    }

    /// Add a joint between two existing bodies.
    pub fn add_joint(&mut self, joint: Joint) -> PhysicsResult<JointHandle> {
        if self.stepping {
            return Err(PhysicsError::InvalidState);
        }
        if !self.bodies.contains_key(joint.body_a) || !self.bodies.contains_key(joint.body_b) {
            return Err(PhysicsError::invalid_argument("joint references an unknown body"));
        }
        Ok(self.joints.insert(joint))
    }

    pub fn remove_joint(&mut self, handle: JointHandle) -> PhysicsResult<()> {
        if self.stepping {
            return Err(PhysicsError::InvalidState);
        }
        if self.joints.remove(handle).is_none() {
            return Err(PhysicsError::invalid_argument("joint handle not found"));
        }
        if let Some(listener) = self.destruction_listener.as_deref_mut() {
            listener.joint_destroyed(handle);
        }
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> PhysicsResult<StepReport> {
        if !(dt > 0.0) {
            return Err(PhysicsError::invalid_argument("dt must be greater than zero"));
        }

        self.stepping = true;
        let report = self.run_step(dt);
        self.stepping = false;
        Ok(report)
    }

    /// Advance the simulation `count` times at `settings.step_frequency`,
    /// aggregating each call's report.
    pub fn step_fixed(&mut self, count: u32) -> PhysicsResult<StepReport> {
        let dt = self.settings.step_frequency;
        let mut total = StepReport::default();
        for _ in 0..count {
            let report = self.step(dt)?;
            total.convergence_shortfall += report.convergence_shortfall;
            total.bodies_put_to_rest += report.bodies_put_to_rest;
        }
        Ok(total)
    }

    fn run_step(&mut self, dt: f64) -> StepReport {
        if let Some(listener) = self.step_listener.as_deref_mut() {
            listener.begin(dt);
        }

        for (_, body) in self.bodies.iter_mut() {
            if body.is_enabled() && !body.is_at_rest() {
                body.integrate_velocity(self.gravity, dt, &self.settings);
            }
        }

        let joint_snapshot: Vec<Joint> = self.joints.values().cloned().collect();
        let listener = self
            .collision_listener
            .as_mut()
            .map(|b| &mut **b as &mut dyn CollisionListener);
        let events = self.contact_manager.update(
            &self.bodies,
            &joint_snapshot,
            &self.settings,
            listener,
        );
        self.dispatch_contact_events(&events);

        let (keys, mut contacts) = self.contact_manager.take_solid_constraints();
        let mut joints = joint_snapshot;
        let islands = build_islands(&self.bodies, &contacts, &joints);

        // A sleeping body touched by an awake body's contact or joint edge
        // is pulled into that island by `build_islands` without being woken
        // first; wake it now so it integrates and solves like any other
        // island member this step.
        for island in &islands {
            for &handle in &island.bodies {
                let body = &mut self.bodies[handle];
                if body.mass_type() != MassType::Infinite && body.is_at_rest() {
                    body.clear_at_rest();
                    body.integrate_velocity(self.gravity, dt, &self.settings);
                }
            }
        }

        for island in &islands {
            solve_velocity_pass(island, &mut self.bodies, &mut contacts, &mut joints, &self.settings, dt);
        }

        if let Some(listener) = self.contact_listener.as_deref_mut() {
            for (index, constraint) in contacts.iter().enumerate() {
                let normal_impulse: f64 = constraint.points.iter().map(|p| p.normal_impulse).sum();
                let tangent_impulse: f64 = constraint.points.iter().map(|p| p.tangent_impulse).sum();
                let (fixture_a, fixture_b) = keys[index];
                listener.post_solve(fixture_a, fixture_b, normal_impulse, tangent_impulse);
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            if body.is_enabled() && !body.is_at_rest() {
                body.integrate_position(dt, &self.settings);
            }
        }

        let mut convergence_shortfall = 0usize;
        let mut island_converged = Vec::with_capacity(islands.len());
        for island in &islands {
            let converged = solve_position_pass(island, &mut self.bodies, &mut contacts, &self.settings);
            if !converged {
                convergence_shortfall += 1;
            }
            island_converged.push(converged);
        }

        self.contact_manager.restore_constraints(keys, contacts);
        for (handle, body) in self.bodies.iter() {
            if body.is_enabled() {
                self.contact_manager.synchronize_body(handle, body);
            }
        }

        self.run_ccd();
        self.check_divergence();
        self.check_bounds();
        let bodies_put_to_rest = self.update_at_rest(dt, &islands, &island_converged);

        if let Some(listener) = self.step_listener.as_deref_mut() {
            listener.end(dt);
        }

        StepReport { convergence_shortfall, bodies_put_to_rest }
    }

    fn dispatch_contact_events(&mut self, events: &[ContactEvent]) {
        let Some(listener) = self.contact_listener.as_deref_mut() else {
            return;
        };
        for event in events {
            match *event {
                ContactEvent::Begin { fixture_a, fixture_b, .. } => listener.begin(fixture_a, fixture_b),
                ContactEvent::Persist { fixture_a, fixture_b } => listener.persist(fixture_a, fixture_b),
                ContactEvent::End { fixture_a, fixture_b, .. } => listener.end(fixture_a, fixture_b),
            }
        }
    }

    /// Sweep every bullet (or, under `CcdMode::All`, every non-infinite-mass
    /// body) against slower-or-static bodies and rewind it to the earliest
    /// time of impact found.
    ///
    /// This only rewinds the transform; it does not re-integrate the
    /// remainder of `dt` or inject a contact immediately (see `DESIGN.md`
    /// for the rationale). The rewound body ends the step within
    /// `linear_tolerance` of the other shape, which the next step's
    /// contact manager picks up and solves normally.
    fn run_ccd(&mut self) {
        if self.settings.ccd_mode == CcdMode::None {
            return;
        }

        let candidates: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_enabled() && !body.is_at_rest() && body.mass_type() != MassType::Infinite)
            .filter(|(_, body)| self.settings.ccd_mode == CcdMode::All || body.is_bullet())
            .map(|(handle, _)| handle)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let mut rewinds: Vec<(BodyHandle, Transform)> = Vec::new();
        for &handle in &candidates {
            let body = &self.bodies[handle];
            let body_speed = body.linear_velocity().length();
            let mut earliest = 1.0f64;

            for (other_handle, other) in self.bodies.iter() {
                if other_handle == handle || !other.is_enabled() {
                    continue;
                }
                let slower_or_static = other.mass_type() == MassType::Infinite || other.linear_velocity().length() <= body_speed;
                if !slower_or_static {
                    continue;
                }

                for fixture_a in body.fixtures() {
                    if fixture_a.is_sensor {
                        continue;
                    }
                    for fixture_b in other.fixtures() {
                        if fixture_b.is_sensor {
                            continue;
                        }
                        let toi = time_of_impact(
                            &fixture_a.shape,
                            body.previous_transform(),
                            body.transform(),
                            &fixture_b.shape,
                            other.previous_transform(),
                            other.transform(),
                            &self.settings,
                        );
                        let fraction = match toi {
                            Toi::Impact { fraction } | Toi::Exhausted { fraction } => fraction,
                            Toi::NoImpact => 1.0,
                        };
                        earliest = earliest.min(fraction);
                    }
                }
            }

            if earliest < 1.0 {
                let rewound = lerp_transform(body.previous_transform(), body.transform(), earliest);
                rewinds.push((handle, rewound));
            }
        }

        for (handle, transform) in rewinds {
            self.bodies[handle].apply_solved_transform(transform);
        }
    }

    fn check_divergence(&mut self) {
        let diverged: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_enabled())
            .filter(|(_, body)| {
                !body.position().is_finite() || !body.linear_velocity().is_finite() || !body.angular_velocity().is_finite()
            })
            .map(|(handle, _)| handle)
            .collect();

        for handle in diverged {
            log::warn!("body {handle:?} diverged (non-finite position or velocity); disabling it");
            self.bodies[handle].set_enabled(false);
            if let Some(listener) = self.step_listener.as_deref_mut() {
                listener.diverged(handle);
            }
        }
    }

    fn check_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let outside: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_enabled())
            .filter_map(|(handle, body)| body_aabb(body).map(|aabb| (handle, aabb)))
            .filter(|(_, aabb)| !bounds.overlaps(aabb))
            .map(|(handle, _)| handle)
            .collect();

        for handle in outside {
            self.bodies[handle].set_enabled(false);
            if let Some(listener) = self.bounds_listener.as_deref_mut() {
                listener.outside(handle);
            }
        }
    }

    fn update_at_rest(&mut self, dt: f64, islands: &[Island], island_converged: &[bool]) -> usize {
        let mut put_to_rest = 0usize;
        for (island, &converged) in islands.iter().zip(island_converged) {
            let dynamic: Vec<BodyHandle> = island
                .bodies
                .iter()
                .copied()
                .filter(|&handle| self.bodies[handle].mass_type() != MassType::Infinite)
                .collect();
            if dynamic.is_empty() {
                continue;
            }

            let all_sleepable = converged
                && dynamic.iter().all(|&handle| {
                    let body = &self.bodies[handle];
                    body.at_rest_detection_enabled()
                        && body.speed_squared_below(self.settings.max_at_rest_linear_velocity, self.settings.max_at_rest_angular_velocity)
                });
            if !all_sleepable {
                continue;
            }

            for &handle in &dynamic {
                if self.bodies[handle].accumulate_at_rest_time(dt, self.settings.min_at_rest_time) {
                    put_to_rest += 1;
                }
            }
        }
        put_to_rest
    }

    pub fn query_aabb(&self, aabb: Aabb) -> Vec<FixtureHandle> {
        self.contact_manager.broadphase().query_aabb(aabb)
    }

    pub fn query_point(&self, point: Vector2) -> Vec<FixtureHandle> {
        self.contact_manager.broadphase().query_point(point)
    }

    /// Cast a ray and report every fixture it crosses (`all = true`) or just
    /// the closest one (`all = false`), ordered by increasing fraction.
    ///
    /// Broad-phase candidates are refined against the exact shape, since
    /// the broad-phase only tests fattened AABBs.
    pub fn raycast(&self, origin: Vector2, direction: Vector2, max_fraction: f64, all: bool) -> Vec<Raycast> {
        let mut hits: Vec<Raycast> = self
            .contact_manager
            .broadphase()
            .raycast(origin, direction, max_fraction)
            .into_iter()
            .filter_map(|(handle, _)| {
                let body = self.bodies.get(handle.body)?;
                let fixture = body.fixtures().get(handle.fixture)?;
                let (fraction, normal) = raycast_shape(&fixture.shape, &body.transform(), origin, direction, max_fraction)?;
                Some(Raycast {
                    fixture: handle,
                    point: origin + direction * fraction,
                    normal,
                    fraction,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.fraction.partial_cmp(&b.fraction).unwrap());
        if !all {
            hits.truncate(1);
        }
        hits
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn body_aabb(body: &Body) -> Option<Aabb> {
    let transform = body.transform();
    body.fixtures()
        .iter()
        .map(|fixture| fixture.shape.aabb(&transform))
        .reduce(|a, b| a.union(&b))
}

/// Exact ray/shape intersection in local shape space via `transform`. Uses
/// the same parametric convention as [`Aabb::raycast`]: a hit is at
/// `origin + t * direction` for `t` in `[0, max_fraction]`.
fn raycast_shape(shape: &Shape, transform: &Transform, origin: Vector2, direction: Vector2, max_fraction: f64) -> Option<(f64, Vector2)> {
    match shape {
        Shape::Circle { center, radius } => {
            let center = transform.apply(*center);
            let to_origin = origin - center;
            let a = direction.dot(direction);
            if a <= f64::EPSILON {
                return None;
            }
            let b = 2.0 * to_origin.dot(direction);
            let c = to_origin.dot(to_origin) - radius * radius;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return None;
            }
            let sqrt_discriminant = discriminant.sqrt();
            let near = (-b - sqrt_discriminant) / (2.0 * a);
            let far = (-b + sqrt_discriminant) / (2.0 * a);
            let fraction = if near >= 0.0 { near } else { far };
            if fraction < 0.0 || fraction > max_fraction {
                return None;
            }
            let point = origin + direction * fraction;
            Some((fraction, (point - center).normalized()))
        }
        Shape::Polygon { .. } | Shape::Segment { .. } => {
            let vertices = shape.vertices(transform);
            let normals = shape.normals(transform);

            let mut t_min = 0.0f64;
            let mut t_max = max_fraction;
            let mut hit_normal: Option<Vector2> = None;

            for (vertex, normal) in vertices.iter().zip(normals.iter()) {
                let numerator = normal.dot(*vertex - origin);
                let denominator = normal.dot(direction);

                if denominator.abs() < f64::EPSILON {
                    if numerator < 0.0 {
                        return None;
                    }
                    continue;
                }

                let t = numerator / denominator;
                if denominator < 0.0 {
                    if t > t_min {
                        t_min = t;
                        hit_normal = Some(*normal);
                    }
                } else if t < t_max {
                    t_max = t;
                }
                if t_min > t_max {
                    return None;
                }
            }

            let normal = hit_normal?;

            if let Shape::Segment { p1, p2, .. } = shape {
                let a = transform.apply(*p1);
                let b = transform.apply(*p2);
                let hit = origin + direction * t_min;
                let edge = b - a;
                let projection = (hit - a).dot(edge) / edge.length_squared();
                if !(-1e-6..=1.0 + 1e-6).contains(&projection) {
                    return None;
                }
            }

            Some((t_min, normal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyBuilder, FixtureDef};

    fn ball_at(x: f64, y: f64) -> Body {
        BodyBuilder::new()
            .position(Vector2::new(x, y))
            .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0))
            .build()
            .unwrap()
    }

    fn ground(half_width: f64, half_height: f64) -> Body {
        BodyBuilder::new()
            .position(Vector2::new(0.0, -half_height))
            .fixture(FixtureDef::new(Shape::rectangle(half_width, half_height).unwrap()).density(0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn a_falling_body_accelerates_under_gravity() {
        let mut world = World::new();
        let handle = world.add_body(ball_at(0.0, 10.0)).unwrap();

        world.step(1.0 / 60.0).unwrap();
        let velocity_after_one_step = world.body(handle).unwrap().linear_velocity().y();

        world.step_fixed(9).unwrap();
        let velocity_after_ten_steps = world.body(handle).unwrap().linear_velocity().y();

        assert!(velocity_after_one_step < 0.0);
        assert!(velocity_after_ten_steps < velocity_after_one_step);
    }

    #[test]
    fn a_body_resting_on_the_ground_eventually_sleeps() {
        let mut world = World::new();
        world.add_body(ground(20.0, 1.0)).unwrap();
        let ball = world.add_body(ball_at(0.0, 0.6)).unwrap();

        let mut put_to_rest = 0;
        for _ in 0..300 {
            put_to_rest += world.step(1.0 / 60.0).unwrap().bodies_put_to_rest;
        }

        assert!(put_to_rest > 0);
        assert!(world.body(ball).unwrap().is_at_rest());
    }

    #[test]
    fn zero_or_negative_dt_is_rejected() {
        let mut world = World::new();
        assert!(world.step(0.0).is_err());
        assert!(world.step(-1.0 / 60.0).is_err());
    }

    #[test]
    fn removing_a_body_cascades_to_its_joints() {
        use crate::constraint::JointKind;

        let mut world = World::new();
        let a = world.add_body(ball_at(-1.0, 5.0)).unwrap();
        let b = world.add_body(ball_at(1.0, 5.0)).unwrap();
        let joint = world
            .add_joint(Joint::new(
                a,
                b,
                JointKind::Rope {
                    anchor_a: Vector2::ZERO,
                    anchor_b: Vector2::ZERO,
                    max_length: 5.0,
                    accumulated_impulse: 0.0,
                },
            ))
            .unwrap();

        world.remove_body(a).unwrap();
        assert!(world.joint(joint).is_none());
    }

    #[test]
    fn structural_mutation_is_rejected_mid_step() {
        struct Recorder;
        impl StepListener for Recorder {}

        let mut world = World::new();
        world.add_body(ball_at(0.0, 5.0)).unwrap();
        // `step` calls back into listeners synchronously but none of them
        // are given `&mut World`, so this just exercises the flag directly.
        world.stepping = true;
        let result = world.add_body(ball_at(0.0, 0.0));
        world.stepping = false;
        assert!(matches!(result, Err(PhysicsError::InvalidState)));
    }

    #[test]
    fn a_bullet_does_not_tunnel_through_a_thin_wall() {
        let mut world = World::new();
        world.set_gravity(Vector2::ZERO);
        world.add_body(
            BodyBuilder::new()
                .position(Vector2::new(5.0, 0.0))
                .fixture(FixtureDef::new(Shape::segment(Vector2::new(0.0, -2.0), Vector2::new(0.0, 2.0), Vector2::new(-1.0, 0.0)).unwrap()).density(0.0))
                .build()
                .unwrap(),
        )
        .unwrap();

        let bullet = world
            .add_body(
                BodyBuilder::new()
                    .position(Vector2::new(0.0, 0.0))
                    .linear_velocity(Vector2::new(600.0, 0.0))
                    .bullet(true)
                    .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.05).unwrap()).density(1.0))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        world.step(1.0 / 60.0).unwrap();
        assert!(world.body(bullet).unwrap().position().x() < 5.0);
    }

    #[test]
    fn raycast_reports_the_closest_fixture_first() {
        let mut world = World::new();
        world.set_gravity(Vector2::ZERO);
        world.add_body(ball_at(5.0, 0.0)).unwrap();
        world.add_body(ball_at(10.0, 0.0)).unwrap();

        let hits = world.raycast(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 20.0, true);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].fraction < hits[1].fraction);
    }
}
