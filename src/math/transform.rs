use super::{Rotation, Vector2};

/// A rigid transform: a [`Rotation`] plus a translation.
///
/// Bundles a position and rotation for composing local shape points into
/// world space during collision queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space translation.
    pub translation: Vector2,
    /// Orientation.
    pub rotation: Rotation,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            translation: Vector2::ZERO,
            rotation: Rotation::identity(),
        }
    }

    /// Construct from a translation and a rotation.
    pub fn new(translation: Vector2, rotation: Rotation) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Construct a transform with no rotation.
    pub fn from_translation(translation: Vector2) -> Self {
        Self {
            translation,
            rotation: Rotation::identity(),
        }
    }

    /// Transform a local-space point into world space.
    pub fn apply(&self, point: Vector2) -> Vector2 {
        self.rotation.rotate(point) + self.translation
    }

    /// Transform a world-space point into this transform's local space.
    pub fn apply_inverse(&self, point: Vector2) -> Vector2 {
        self.rotation.inverse_rotate(point - self.translation)
    }

    /// Transform a local-space direction (no translation) into world space.
    pub fn apply_vector(&self, direction: Vector2) -> Vector2 {
        self.rotation.rotate(direction)
    }

    /// Transform a world-space direction into local space.
    pub fn apply_inverse_vector(&self, direction: Vector2) -> Vector2 {
        self.rotation.inverse_rotate(direction)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_apply_inverse_is_identity() {
        let transform = Transform::new(Vector2::new(5.0, -2.0), Rotation::from_radians(0.7));
        let point = Vector2::new(1.0, 2.0);

        let roundtrip = transform.apply_inverse(transform.apply(point));
        assert!((roundtrip.x() - point.x()).abs() < 1e-9);
        assert!((roundtrip.y() - point.y()).abs() < 1e-9);
    }
}
