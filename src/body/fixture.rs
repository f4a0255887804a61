use crate::error::{PhysicsError, PhysicsResult};
use crate::geometry::{Mass, Shape};

use super::filter::Filter;

/// Parameters for creating a [`Fixture`], validated on [`Body::add_fixture`].
///
/// [`Body::add_fixture`]: super::body::Body::add_fixture
#[derive(Debug, Clone)]
pub struct FixtureDef {
    pub shape: Shape,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub restitution_threshold: f64,
    pub is_sensor: bool,
    pub filter: Filter,
}

impl FixtureDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            restitution_threshold: 1.0,
            is_sensor: false,
            filter: Filter::default(),
        }
    }

    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn restitution_threshold(mut self, threshold: f64) -> Self {
        self.restitution_threshold = threshold;
        self
    }

    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub(crate) fn validate(&self) -> PhysicsResult<()> {
        if self.density < 0.0 {
            return Err(PhysicsError::invalid_argument("fixture density must be >= 0"));
        }
        if self.friction < 0.0 {
            return Err(PhysicsError::invalid_argument(
                "fixture friction must be >= 0",
            ));
        }
        if self.restitution < 0.0 {
            return Err(PhysicsError::invalid_argument(
                "fixture restitution must be >= 0",
            ));
        }
        Ok(())
    }
}

/// A shape attached to a body, with the material properties the solver and
/// contact manager need.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub shape: Shape,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub restitution_threshold: f64,
    pub is_sensor: bool,
    pub filter: Filter,
}

impl Fixture {
    pub(crate) fn from_def(def: FixtureDef) -> Self {
        Self {
            shape: def.shape,
            density: def.density,
            friction: def.friction,
            restitution: def.restitution,
            restitution_threshold: def.restitution_threshold,
            is_sensor: def.is_sensor,
            filter: def.filter,
        }
    }

    /// Mass contribution of this fixture in the body's local frame.
    pub fn create_mass(&self) -> Mass {
        self.shape.create_mass(self.density)
    }
}
