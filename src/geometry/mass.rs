use crate::math::Vector2;

/// How a body's [`Mass`] participates in the solver.
///
/// Four tags rather than a single static/dynamic flag, so a body can
/// independently have infinite linear or angular response (a flywheel
/// with finite mass but no rotational inertia, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MassType {
    /// Finite mass and inertia; responds normally to forces and torques.
    Normal,
    /// Finite inertia, infinite mass: rotates freely, no linear response.
    InfiniteMass,
    /// Finite mass, infinite inertia: translates freely, no angular response.
    InfiniteInertia,
    /// Both infinite. Static unless given nonzero velocity (kinematic).
    #[default]
    Infinite,
}

/// Mass properties of a body, aggregated from its fixtures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass {
    /// Center of mass, in the body's local frame.
    pub center: Vector2,
    /// Mass in kilograms. Zero when `mass_type` has infinite mass.
    pub mass: f64,
    /// Second moment of area about the center of mass.
    pub inertia: f64,
    /// `1 / mass`, or `0` for infinite mass.
    pub inv_mass: f64,
    /// `1 / inertia`, or `0` for infinite inertia.
    pub inv_inertia: f64,
    /// Which components of the mass are finite.
    pub mass_type: MassType,
}

impl Mass {
    /// The degenerate "infinite at origin" mass used for static bodies and
    /// for bodies whose fixtures all have zero density.
    pub fn infinite_at_origin() -> Self {
        Self {
            center: Vector2::ZERO,
            mass: 0.0,
            inertia: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            mass_type: MassType::Infinite,
        }
    }

    /// Construct a finite mass from raw moments (mass, center, inertia
    /// already shifted to be about that center).
    pub fn new(center: Vector2, mass: f64, inertia: f64) -> Self {
        if mass <= 0.0 {
            return Self::infinite_at_origin();
        }

        let inv_mass = 1.0 / mass;
        let inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        let mass_type = if inertia > 0.0 {
            MassType::Normal
        } else {
            MassType::InfiniteInertia
        };

        Self {
            center,
            mass,
            inertia,
            inv_mass,
            inv_inertia,
            mass_type,
        }
    }

    /// Re-derive `inv_mass`/`inv_inertia` after `mass_type` has been
    /// overridden explicitly (e.g. `Body::set_mass_type`).
    pub fn with_type(mut self, mass_type: MassType) -> Self {
        self.mass_type = mass_type;
        match mass_type {
            MassType::Normal => {
                self.inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
                self.inv_inertia = if self.inertia > 0.0 {
                    1.0 / self.inertia
                } else {
                    0.0
                };
            }
            MassType::InfiniteMass => {
                self.inv_mass = 0.0;
                self.inv_inertia = if self.inertia > 0.0 {
                    1.0 / self.inertia
                } else {
                    0.0
                };
            }
            MassType::InfiniteInertia => {
                self.inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
                self.inv_inertia = 0.0;
            }
            MassType::Infinite => {
                self.inv_mass = 0.0;
                self.inv_inertia = 0.0;
            }
        }
        self
    }

    /// Combine this mass with another, as if both fixtures belonged to the
    /// same body: masses sum, centers are mass-weighted, inertia sums via
    /// the parallel-axis theorem around the combined center.
    pub fn add(self, other: Self) -> Self {
        let total_mass = self.mass + other.mass;
        if total_mass <= 0.0 {
            return Self::infinite_at_origin();
        }

        let center =
            (self.center * self.mass + other.center * other.mass) / total_mass;

        let shift = |m: &Self, combined_center: Vector2| -> f64 {
            if m.mass <= 0.0 {
                return 0.0;
            }
            let d = m.center.distance(combined_center);
            m.inertia + m.mass * d * d
        };

        let inertia = shift(&self, center) + shift(&other, center);

        Self::new(center, total_mass, inertia)
    }
}

impl Default for Mass {
    fn default() -> Self {
        Self::infinite_at_origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_density_aggregate_is_infinite_at_origin() {
        let zero = Mass::new(Vector2::ZERO, 0.0, 0.0);
        assert_eq!(zero.mass_type, MassType::Infinite);
        assert_eq!(zero.inv_mass, 0.0);
    }

    #[test]
    fn adding_two_equal_point_masses_centers_between_them() {
        let a = Mass::new(Vector2::new(-1.0, 0.0), 1.0, 0.0);
        let b = Mass::new(Vector2::new(1.0, 0.0), 1.0, 0.0);
        let combined = a.add(b);

        assert!((combined.mass - 2.0).abs() < 1e-12);
        assert!(combined.center.x().abs() < 1e-12);
        // Parallel-axis: each unit mass is 1m from the combined center.
        assert!((combined.inertia - 2.0).abs() < 1e-9);
    }
}
