use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::Vector2;

/// Rotation stored as its sine and cosine parts.
///
/// Composing two rotations this way never needs to re-derive an angle with
/// `atan2`, so repeated small increments (as applied every integration
/// step) don't accumulate the error a stored-angle representation would.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    cos: f64,
    sin: f64,
}

impl Rotation {
    /// No rotation.
    pub fn identity() -> Self {
        Self { cos: 1.0, sin: 0.0 }
    }

    /// Construct from an angle in radians.
    pub fn from_radians(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { sin, cos }
    }

    /// Construct directly from sine and cosine; `sin² + cos²` need not be
    /// exactly `1` (the caller is trusted, e.g. after incremental updates).
    pub fn from_sin_cos(sin: f64, cos: f64) -> Self {
        Self { sin, cos }
    }

    /// Angle in radians, in `(-pi, pi]`.
    pub fn angle(self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// Sine of the angle.
    pub fn sin(self) -> f64 {
        self.sin
    }

    /// Cosine of the angle.
    pub fn cos(self) -> f64 {
        self.cos
    }

    /// Rotate a vector by this rotation.
    pub fn rotate(self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.cos * v.x() - self.sin * v.y(),
            self.sin * v.x() + self.cos * v.y(),
        )
    }

    /// Rotate a vector by the inverse of this rotation.
    pub fn inverse_rotate(self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.cos * v.x() + self.sin * v.y(),
            -self.sin * v.x() + self.cos * v.y(),
        )
    }

    /// The inverse rotation.
    pub fn inverse(self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }

    /// Renormalize so `sin² + cos² == 1`, correcting drift from repeated
    /// incremental composition.
    pub fn normalize(self) -> Self {
        let mag = (self.sin * self.sin + self.cos * self.cos).sqrt();
        if mag < f64::EPSILON {
            Self::identity()
        } else {
            Self {
                sin: self.sin / mag,
                cos: self.cos / mag,
            }
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<f64> for Rotation {
    fn from(angle: f64) -> Self {
        Self::from_radians(angle)
    }
}

impl Add for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cos: self.cos * rhs.cos - self.sin * rhs.sin,
            sin: self.sin * rhs.cos + self.cos * rhs.sin,
        }
    }
}

impl Add<f64> for Rotation {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        self + Self::from_radians(rhs)
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl AddAssign<f64> for Rotation {
    fn add_assign(&mut self, rhs: f64) {
        *self = *self + rhs;
    }
}

impl Sub for Rotation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl SubAssign for Rotation {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Rotation {
    type Output = Self;

    fn neg(self) -> Self {
        self.inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_matches_angle_addition() {
        let a = Rotation::from_radians(90f64.to_radians());
        let b = Rotation::from_radians(45f64.to_radians());

        assert!(((a + b).angle().to_degrees() - 135.0).abs() < 1e-9);
        assert!(((a - b).angle().to_degrees() - 45.0).abs() < 1e-9);
        assert!(((-a).angle().to_degrees() + 90.0).abs() < 1e-9);
    }

    #[test]
    fn rotate_then_inverse_rotate_is_identity() {
        let r = Rotation::from_radians(37f64.to_radians());
        let v = Vector2::new(3.0, -4.0);

        let roundtrip = r.inverse_rotate(r.rotate(v));
        assert!((roundtrip.x() - v.x()).abs() < 1e-9);
        assert!((roundtrip.y() - v.y()).abs() < 1e-9);
    }
}
