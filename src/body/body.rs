use crate::error::{PhysicsError, PhysicsResult};
use crate::geometry::{Mass, MassType};
use crate::math::{Transform, Vector2};
use crate::settings::Settings;

use super::fixture::{Fixture, FixtureDef};
use super::force::ForceAccumulator;

/// Whether a body participates in integration/collision at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Infinite mass, never moves unless teleported.
    Static,
    /// Infinite mass but nonzero velocity is honored (no collision response
    /// applied back to it).
    Kinematic,
    /// Finite mass, fully simulated.
    Dynamic,
}

/// A rigid body: an ordered list of fixtures sharing one transform.
///
/// Tracks current and previous position/rotation (the latter feeds CCD
/// sweeps and contact warm-start matching), velocity, damping, aggregate
/// mass/inertia, per-entry timed force accumulators, and the at-rest state
/// machine that lets islands stop solving a body that's settled.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) fixtures: Vec<Fixture>,
    pub(crate) mass: Mass,
    pub(crate) transform: Transform,
    pub(crate) previous_transform: Transform,
    pub(crate) rotation_disc_radius: f64,

    pub(crate) linear_velocity: Vector2,
    pub(crate) angular_velocity: f64,
    pub(crate) linear_damping: f64,
    pub(crate) angular_damping: f64,
    pub(crate) gravity_scale: f64,

    pub(crate) forces: ForceAccumulator,

    pub(crate) is_bullet: bool,
    pub(crate) is_enabled: bool,
    pub(crate) at_rest_detection_enabled: bool,
    pub(crate) is_at_rest: bool,
    pub(crate) at_rest_time: f64,
}

impl Body {
    pub(crate) fn new(transform: Transform) -> Self {
        Self {
            fixtures: Vec::new(),
            mass: Mass::infinite_at_origin(),
            transform,
            previous_transform: transform,
            rotation_disc_radius: 0.0,
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            forces: ForceAccumulator::default(),
            is_bullet: false,
            is_enabled: true,
            at_rest_detection_enabled: true,
            is_at_rest: false,
            at_rest_time: 0.0,
        }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn previous_transform(&self) -> Transform {
        self.previous_transform
    }

    pub fn position(&self) -> Vector2 {
        self.transform.translation
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    pub fn mass_type(&self) -> MassType {
        self.mass.mass_type
    }

    pub fn rotation_disc_radius(&self) -> f64 {
        self.rotation_disc_radius
    }

    pub fn linear_velocity(&self) -> Vector2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn is_bullet(&self) -> bool {
        self.is_bullet
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn is_at_rest(&self) -> bool {
        self.is_at_rest
    }

    pub fn at_rest_detection_enabled(&self) -> bool {
        self.at_rest_detection_enabled
    }

    pub fn body_type(&self) -> BodyType {
        match self.mass.mass_type {
            MassType::Infinite if self.linear_velocity == Vector2::ZERO && self.angular_velocity == 0.0 => {
                BodyType::Static
            }
            MassType::Infinite => BodyType::Kinematic,
            _ => BodyType::Dynamic,
        }
    }

    /// Velocity of the material point `world_point` on this body (accounts
    /// for angular velocity around the center of mass).
    pub fn velocity_at_point(&self, world_point: Vector2) -> Vector2 {
        let r = world_point - self.world_center();
        self.linear_velocity + Vector2::cross_scalar(self.angular_velocity, r)
    }

    /// Center of mass in world space.
    pub fn world_center(&self) -> Vector2 {
        self.transform.apply(self.mass.center)
    }

    /// Attach a fixture, re-deriving mass and rotation-disc radius.
    /// Clears at-rest. Fails if the fixture's parameters are invalid.
    pub fn add_fixture(&mut self, def: FixtureDef) -> PhysicsResult<()> {
        def.validate()?;
        self.fixtures.push(Fixture::from_def(def));
        self.update_mass();
        self.clear_at_rest();
        Ok(())
    }

    /// Recompute `mass` and `rotation_disc_radius` from the current fixture
    /// list. Bodies with no fixtures, or whose fixtures are all zero
    /// density, get the degenerate infinite-at-origin mass.
    pub fn update_mass(&mut self) {
        let aggregate = self
            .fixtures
            .iter()
            .map(Fixture::create_mass)
            .fold(None, |acc: Option<Mass>, m| {
                Some(match acc {
                    Some(acc) => acc.add(m),
                    None => m,
                })
            })
            .unwrap_or_default();

        self.mass = aggregate;
        self.rotation_disc_radius = self
            .fixtures
            .iter()
            .map(|f| f.shape.farthest_distance_from(self.mass.center))
            .fold(0.0, f64::max);
    }

    /// Override how this body's mass participates in the solver (e.g. force
    /// a dynamic body to never rotate). Clears at-rest.
    pub fn set_mass_type(&mut self, mass_type: MassType) {
        self.mass = self.mass.with_type(mass_type);
        self.clear_at_rest();
    }

    /// Replace the computed mass with an explicit one. Clears at-rest.
    pub fn set_mass(&mut self, mass: Mass) {
        self.mass = mass;
        self.clear_at_rest();
    }

    pub fn set_linear_velocity(&mut self, velocity: Vector2) {
        self.linear_velocity = velocity;
        self.clear_at_rest();
    }

    pub fn set_angular_velocity(&mut self, velocity: f64) {
        self.angular_velocity = velocity;
        self.clear_at_rest();
    }

    pub fn set_linear_damping(&mut self, damping: f64) -> PhysicsResult<()> {
        if damping < 0.0 {
            return Err(PhysicsError::invalid_argument("linear damping must be >= 0"));
        }
        self.linear_damping = damping;
        self.clear_at_rest();
        Ok(())
    }

    pub fn set_angular_damping(&mut self, damping: f64) -> PhysicsResult<()> {
        if damping < 0.0 {
            return Err(PhysicsError::invalid_argument(
                "angular damping must be >= 0",
            ));
        }
        self.angular_damping = damping;
        self.clear_at_rest();
        Ok(())
    }

    pub fn set_gravity_scale(&mut self, scale: f64) {
        self.gravity_scale = scale;
        self.clear_at_rest();
    }

    pub fn set_bullet(&mut self, is_bullet: bool) {
        self.is_bullet = is_bullet;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
        self.clear_at_rest();
    }

    pub fn set_at_rest_detection_enabled(&mut self, enabled: bool) {
        self.at_rest_detection_enabled = enabled;
        if !enabled {
            self.clear_at_rest();
        }
    }

    /// Force the at-rest flag directly, zeroing velocities/accumulators
    /// when setting it and clearing `at_rest_time` when unsetting it.
    pub fn set_at_rest(&mut self, at_rest: bool) {
        if at_rest {
            self.put_to_rest();
        } else {
            self.clear_at_rest();
        }
    }

    /// Apply a force at the center of mass, lasting for `remaining_life`
    /// seconds (`f64::INFINITY` for a persistent force). Clears at-rest.
    pub fn apply_force(&mut self, force: Vector2, remaining_life: f64) {
        self.forces.push_force(force, remaining_life);
        self.clear_at_rest();
    }

    /// Apply a force at a world-space point, decomposing it into a force at
    /// the center of mass plus the torque it induces.
    pub fn apply_force_at_point(&mut self, force: Vector2, point: Vector2, remaining_life: f64) {
        let torque = (point - self.world_center()).cross(force);
        self.forces.push_force(force, remaining_life);
        self.forces.push_torque(torque, remaining_life);
        self.clear_at_rest();
    }

    pub fn apply_torque(&mut self, torque: f64, remaining_life: f64) {
        self.forces.push_torque(torque, remaining_life);
        self.clear_at_rest();
    }

    /// Apply an instantaneous impulse at the center of mass.
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        self.linear_velocity = self.linear_velocity + impulse * self.mass.inv_mass;
        self.clear_at_rest();
    }

    /// Apply an instantaneous impulse at a world-space point.
    pub fn apply_impulse_at_point(&mut self, impulse: Vector2, point: Vector2) {
        self.linear_velocity = self.linear_velocity + impulse * self.mass.inv_mass;
        let r = point - self.world_center();
        self.angular_velocity += self.mass.inv_inertia * r.cross(impulse);
        self.clear_at_rest();
    }

    pub(crate) fn clear_at_rest(&mut self) {
        self.is_at_rest = false;
        self.at_rest_time = 0.0;
    }

    pub(crate) fn put_to_rest(&mut self) {
        self.is_at_rest = true;
        self.linear_velocity = Vector2::ZERO;
        self.angular_velocity = 0.0;
        self.forces.clear();
    }

    /// Accumulate time spent under both at-rest velocity thresholds; once
    /// `at_rest_time` reaches `min_at_rest_time` the body is put to rest.
    /// Returns whether this call just crossed the threshold.
    pub(crate) fn accumulate_at_rest_time(&mut self, dt: f64, min_at_rest_time: f64) -> bool {
        self.at_rest_time += dt;
        if self.at_rest_time >= min_at_rest_time {
            self.put_to_rest();
            true
        } else {
            false
        }
    }

    /// Integrate velocity for one step: gravity, accumulated forces/torques,
    /// then multiplicative damping. Static/kinematic bodies never move.
    pub(crate) fn integrate_velocity(&mut self, gravity: Vector2, dt: f64, settings: &Settings) {
        if self.mass.inv_mass > 0.0 {
            let acceleration = gravity * self.gravity_scale + self.forces.net_force() * self.mass.inv_mass;
            self.linear_velocity = self.linear_velocity + acceleration * dt;
        }
        if self.mass.inv_inertia > 0.0 {
            self.angular_velocity += self.forces.net_torque() * self.mass.inv_inertia * dt;
        }

        self.forces.advance(dt);

        self.linear_velocity = self.linear_velocity * (1.0 - dt * self.linear_damping).clamp(0.0, 1.0);
        self.angular_velocity *= (1.0 - dt * self.angular_damping).clamp(0.0, 1.0);

        let _ = settings;
    }

    /// Integrate position for one step, clamping translation/rotation
    /// magnitude to avoid tunneling through an otherwise-solved contact.
    /// The velocity is scaled down by the same ratio as the step, so a
    /// clamp this step doesn't leave the body carrying speed it can never
    /// actually use.
    pub(crate) fn integrate_position(&mut self, dt: f64, settings: &Settings) {
        self.previous_transform = self.transform;

        let mut translation = self.linear_velocity * dt;
        let mut rotation = self.angular_velocity * dt;
        let mut ratio = 1.0;

        let translation_len = translation.length();
        if translation_len > settings.max_translation {
            let scale = settings.max_translation / translation_len;
            translation = translation * scale;
            rotation *= scale;
            ratio *= scale;
        }
        if rotation.abs() > settings.max_rotation {
            let scale = settings.max_rotation / rotation.abs();
            rotation *= scale;
            translation = translation * scale;
            ratio *= scale;
        }

        if ratio < 1.0 {
            self.linear_velocity = self.linear_velocity * ratio;
            self.angular_velocity *= ratio;
        }

        self.transform.translation = self.transform.translation + translation;
        self.transform.rotation = (self.transform.rotation + rotation).normalize();
    }

    /// Write back a transform nudged by the position-correction pass,
    /// without touching `previous_transform` (already captured by
    /// `integrate_position` earlier in the same step).
    pub(crate) fn apply_solved_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Write back velocities produced by the constraint solver. Unlike
    /// `set_linear_velocity`/`set_angular_velocity` this does not clear
    /// at-rest: the caller recomputes at-rest state once from the solved
    /// speed rather than forcing it awake on every step.
    pub(crate) fn apply_solved_velocity(&mut self, linear: Vector2, angular: f64) {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
    }

    pub(crate) fn speed_squared_below(&self, linear_threshold: f64, angular_threshold: f64) -> bool {
        self.linear_velocity.length_squared() < linear_threshold * linear_threshold
            && self.angular_velocity.abs() < angular_threshold
    }
}

/// Fluent constructor for a [`Body`], one builder covering both static and
/// dynamic construction so callers don't juggle separate constructors per
/// body type.
pub struct BodyBuilder {
    transform: Transform,
    linear_velocity: Vector2,
    angular_velocity: f64,
    linear_damping: f64,
    angular_damping: f64,
    gravity_scale: f64,
    is_bullet: bool,
    at_rest_detection_enabled: bool,
    fixtures: Vec<FixtureDef>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self {
            transform: Transform::identity(),
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            is_bullet: false,
            at_rest_detection_enabled: true,
            fixtures: Vec::new(),
        }
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn position(mut self, position: Vector2) -> Self {
        self.transform.translation = position;
        self
    }

    pub fn linear_velocity(mut self, velocity: Vector2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn angular_velocity(mut self, velocity: f64) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn linear_damping(mut self, damping: f64) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn angular_damping(mut self, damping: f64) -> Self {
        self.angular_damping = damping;
        self
    }

    pub fn gravity_scale(mut self, scale: f64) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn bullet(mut self, is_bullet: bool) -> Self {
        self.is_bullet = is_bullet;
        self
    }

    pub fn at_rest_detection_enabled(mut self, enabled: bool) -> Self {
        self.at_rest_detection_enabled = enabled;
        self
    }

    pub fn fixture(mut self, def: FixtureDef) -> Self {
        self.fixtures.push(def);
        self
    }

    pub fn build(self) -> PhysicsResult<Body> {
        for def in &self.fixtures {
            def.validate()?;
        }

        let mut body = Body::new(self.transform);
        body.linear_velocity = self.linear_velocity;
        body.angular_velocity = self.angular_velocity;
        body.linear_damping = self.linear_damping;
        body.angular_damping = self.angular_damping;
        body.gravity_scale = self.gravity_scale;
        body.is_bullet = self.is_bullet;
        body.at_rest_detection_enabled = self.at_rest_detection_enabled;
        body.fixtures = self.fixtures.into_iter().map(Fixture::from_def).collect();
        body.update_mass();
        Ok(body)
    }
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn unit_square_def() -> FixtureDef {
        FixtureDef::new(Shape::rectangle(0.5, 0.5).unwrap()).density(1.0)
    }

    #[test]
    fn static_body_has_infinite_mass_and_zero_velocity() {
        let body = BodyBuilder::new().build().unwrap();
        assert_eq!(body.mass_type(), MassType::Infinite);
        assert_eq!(body.body_type(), BodyType::Static);
    }

    #[test]
    fn adding_a_fixture_updates_mass_and_clears_at_rest() {
        let mut body = BodyBuilder::new().build().unwrap();
        body.put_to_rest();
        body.add_fixture(unit_square_def()).unwrap();
        assert!(!body.is_at_rest());
        assert_eq!(body.mass_type(), MassType::Normal);
        assert!((body.mass().mass - 1.0).abs() < 1e-9);
    }

    #[test]
    fn applying_force_clears_at_rest() {
        let mut body = BodyBuilder::new().fixture(unit_square_def()).build().unwrap();
        body.put_to_rest();
        body.apply_force(Vector2::new(0.0, 100.0), f64::INFINITY);
        assert!(!body.is_at_rest());
    }

    #[test]
    fn at_rest_implies_zero_velocity_and_empty_accumulators() {
        let mut body = BodyBuilder::new().fixture(unit_square_def()).build().unwrap();
        body.set_linear_velocity(Vector2::new(3.0, 4.0));
        body.apply_torque(1.0, f64::INFINITY);
        body.put_to_rest();

        assert_eq!(body.linear_velocity(), Vector2::ZERO);
        assert_eq!(body.angular_velocity(), 0.0);
        assert!(body.forces.is_empty());
    }

    #[test]
    fn kinematic_body_has_infinite_mass_but_nonzero_velocity() {
        let body = BodyBuilder::new()
            .linear_velocity(Vector2::new(1.0, 0.0))
            .build()
            .unwrap();
        assert_eq!(body.body_type(), BodyType::Kinematic);
    }
}
