use crate::math::Vector2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Lower-left corner.
    pub min: Vector2,
    /// Upper-right corner.
    pub max: Vector2,
}

impl Aabb {
    /// Construct from two corners, ordering them so `min <= max`.
    pub fn new(a: Vector2, b: Vector2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Width and height.
    pub fn extents(&self) -> Vector2 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Grow by a uniform margin on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector2::new(margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Smallest AABB containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether `self` fully contains `other`.
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x() <= other.min.x()
            && self.min.y() <= other.min.y()
            && other.max.x() <= self.max.x()
            && other.max.y() <= self.max.y()
    }

    /// Whether two AABBs overlap, including touching edges.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x() <= other.max.x()
            && other.min.x() <= self.max.x()
            && self.min.y() <= other.max.y()
            && other.min.y() <= self.max.y()
    }

    /// Whether a point lies inside (inclusive).
    pub fn contains_point(&self, point: Vector2) -> bool {
        point.x() >= self.min.x()
            && point.x() <= self.max.x()
            && point.y() >= self.min.y()
            && point.y() <= self.max.y()
    }

    /// Surface area metric used to score broad-phase tree insertion
    /// (perimeter in 2D rather than area, the standard dynamic-tree cost).
    pub fn perimeter(&self) -> f64 {
        let e = self.extents();
        2.0 * (e.x() + e.y())
    }

    /// Ray/segment vs AABB slab test; returns the entry fraction `t` in
    /// `[0, max_fraction]` if the ray hits.
    pub fn raycast(&self, origin: Vector2, direction: Vector2, max_fraction: f64) -> Option<f64> {
        let mut t_min = 0.0f64;
        let mut t_max = max_fraction;

        for axis in 0..2 {
            let (o, d, lo, hi) = if axis == 0 {
                (origin.x(), direction.x(), self.min.x(), self.max.x())
            } else {
                (origin.y(), direction.y(), self.min.y(), self.max.y())
            };

            if d.abs() < f64::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let inv_d = 1.0 / d;
                let mut t1 = (lo - o) * inv_d;
                let mut t2 = (hi - o) * inv_d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_contains_both_inputs() {
        let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::new(Vector2::new(2.0, -1.0), Vector2::new(3.0, 0.5));
        let u = a.union(&b);

        assert!(u.contains(&a));
        assert!(u.contains(&b));
    }

    #[test]
    fn overlap_detects_touching_edges() {
        let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::new(Vector2::new(1.0, 0.0), Vector2::new(2.0, 1.0));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn raycast_hits_box_from_outside() {
        let aabb = Aabb::new(Vector2::new(-1.0, -1.0), Vector2::new(1.0, 1.0));
        let t = aabb.raycast(Vector2::new(-5.0, 0.0), Vector2::new(1.0, 0.0), 100.0);
        assert!(t.is_some());
        assert!((t.unwrap() - 4.0).abs() < 1e-9);
    }
}
