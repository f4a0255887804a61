use arrayvec::ArrayVec;

use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Transform, Vector2};

use super::aabb::Aabb;
use super::mass::Mass;

/// Polygons are capped at this many vertices, stored in a fixed-capacity
/// `ArrayVec` rather than a heap vector on the hot collision path.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// A convex shape local to a fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Vector2,
        radius: f64,
    },
    Polygon {
        vertices: ArrayVec<Vector2, MAX_POLYGON_VERTICES>,
        normals: ArrayVec<Vector2, MAX_POLYGON_VERTICES>,
    },
    Segment {
        p1: Vector2,
        p2: Vector2,
        normal: Vector2,
    },
}

impl Shape {
    /// Construct a circle. Fails if `radius` is not positive.
    pub fn circle(center: Vector2, radius: f64) -> PhysicsResult<Self> {
        if radius <= 0.0 {
            return Err(PhysicsError::invalid_argument(
                "circle radius must be positive",
            ));
        }
        Ok(Self::Circle { center, radius })
    }

    /// Construct a convex polygon from a counter-clockwise vertex loop,
    /// precomputing outward unit normals. Fails on fewer than 3 vertices,
    /// a non-convex loop, or a clockwise (negative-area) loop.
    pub fn polygon(points: &[Vector2]) -> PhysicsResult<Self> {
        if points.len() < 3 {
            return Err(PhysicsError::invalid_argument(
                "polygon needs at least 3 vertices",
            ));
        }
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(PhysicsError::invalid_argument(format!(
                "polygon exceeds the {MAX_POLYGON_VERTICES}-vertex limit"
            )));
        }

        let area = signed_area(points);
        if area <= 0.0 {
            return Err(PhysicsError::invalid_argument(
                "polygon must be wound counter-clockwise",
            ));
        }

        if !is_convex(points) {
            return Err(PhysicsError::invalid_argument(
                "polygon must be convex",
            ));
        }

        let mut vertices = ArrayVec::new();
        let mut normals = ArrayVec::new();
        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let edge = b - a;
            vertices.push(a);
            // `perp()` rotates +90 degrees (left of the edge); a
            // counter-clockwise loop needs the outward normal on the right.
            normals.push((-edge.perp()).normalized());
        }

        Ok(Self::Polygon { vertices, normals })
    }

    /// Construct an axis-aligned rectangle polygon centered at the origin.
    pub fn rectangle(half_width: f64, half_height: f64) -> PhysicsResult<Self> {
        Self::polygon(&[
            Vector2::new(-half_width, -half_height),
            Vector2::new(half_width, -half_height),
            Vector2::new(half_width, half_height),
            Vector2::new(-half_width, half_height),
        ])
    }

    /// Construct a one-sided line segment with an explicit outward normal.
    /// Fails if the two endpoints coincide.
    pub fn segment(p1: Vector2, p2: Vector2, normal: Vector2) -> PhysicsResult<Self> {
        if (p2 - p1).length_squared() <= f64::EPSILON {
            return Err(PhysicsError::invalid_argument(
                "segment endpoints must not coincide",
            ));
        }
        Ok(Self::Segment {
            p1,
            p2,
            normal: normal.normalized(),
        })
    }

    /// World-space AABB of this shape under `transform`.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        match self {
            Self::Circle { center, radius } => {
                let c = transform.apply(*center);
                let r = Vector2::new(*radius, *radius);
                Aabb::new(c - r, c + r)
            }
            Self::Polygon { vertices, .. } => {
                let mut world = vertices.iter().map(|v| transform.apply(*v));
                let first = world.next().expect("polygon has at least 3 vertices");
                world.fold(Aabb::new(first, first), |acc, p| {
                    acc.union(&Aabb::new(p, p))
                })
            }
            Self::Segment { p1, p2, .. } => {
                Aabb::new(transform.apply(*p1), transform.apply(*p2))
            }
        }
    }

    /// Whether a world-space point lies inside this shape under `transform`.
    pub fn contains_point(&self, transform: &Transform, point: Vector2) -> bool {
        match self {
            Self::Circle { center, radius } => {
                let c = transform.apply(*center);
                c.distance(point) <= *radius
            }
            Self::Polygon { vertices, normals } => {
                let local = transform.apply_inverse(point);
                vertices
                    .iter()
                    .zip(normals.iter())
                    .all(|(v, n)| n.dot(local - *v) <= 0.0)
            }
            // A segment has zero area; only points on the line count, which
            // has probability zero for arbitrary queries and no caller in
            // this engine relies on it.
            Self::Segment { .. } => false,
        }
    }

    /// Project this shape (under `transform`) onto a world-space axis,
    /// returning `(min, max)`.
    pub fn project(&self, transform: &Transform, axis: Vector2) -> (f64, f64) {
        match self {
            Self::Circle { center, radius } => {
                let c = transform.apply(*center).dot(axis);
                (c - radius, c + radius)
            }
            Self::Polygon { vertices, .. } => {
                let mut iter = vertices.iter().map(|v| transform.apply(*v).dot(axis));
                let first = iter.next().expect("polygon has at least 3 vertices");
                iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)))
            }
            Self::Segment { p1, p2, .. } => {
                let a = transform.apply(*p1).dot(axis);
                let b = transform.apply(*p2).dot(axis);
                (a.min(b), a.max(b))
            }
        }
    }

    /// The vertex farthest along `direction` (world space), used by SAT and
    /// by GJK-style support queries.
    pub fn support(&self, transform: &Transform, direction: Vector2) -> Vector2 {
        match self {
            Self::Circle { center, radius } => {
                transform.apply(*center) + direction.normalized() * *radius
            }
            Self::Polygon { vertices, .. } => {
                vertices
                    .iter()
                    .map(|v| transform.apply(*v))
                    .max_by(|a, b| {
                        a.dot(direction)
                            .partial_cmp(&b.dot(direction))
                            .expect("direction and vertices are finite")
                    })
                    .expect("polygon has at least 3 vertices")
            }
            Self::Segment { p1, p2, .. } => {
                let a = transform.apply(*p1);
                let b = transform.apply(*p2);
                if a.dot(direction) >= b.dot(direction) {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// World-space outward face normals (the `Wound` capability): the unit
    /// normals a manifold builder clips against. Circles have none.
    pub fn normals(&self, transform: &Transform) -> ArrayVec<Vector2, MAX_POLYGON_VERTICES> {
        match self {
            Self::Circle { .. } => ArrayVec::new(),
            Self::Polygon { normals, .. } => {
                normals.iter().map(|n| transform.apply_vector(*n)).collect()
            }
            Self::Segment { normal, .. } => {
                let mut out = ArrayVec::new();
                out.push(transform.apply_vector(*normal));
                out
            }
        }
    }

    /// World-space vertex loop.
    pub fn vertices(&self, transform: &Transform) -> ArrayVec<Vector2, MAX_POLYGON_VERTICES> {
        match self {
            Self::Circle { center, .. } => {
                let mut out = ArrayVec::new();
                out.push(transform.apply(*center));
                out
            }
            Self::Polygon { vertices, .. } => {
                vertices.iter().map(|v| transform.apply(*v)).collect()
            }
            Self::Segment { p1, p2, .. } => {
                let mut out = ArrayVec::new();
                out.push(transform.apply(*p1));
                out.push(transform.apply(*p2));
                out
            }
        }
    }

    /// Farthest distance from `local_point` to any point on this shape, used
    /// to compute a body's rotation-disc radius.
    pub fn farthest_distance_from(&self, local_point: Vector2) -> f64 {
        match self {
            Self::Circle { center, radius } => center.distance(local_point) + radius,
            Self::Polygon { vertices, .. } => vertices
                .iter()
                .map(|v| v.distance(local_point))
                .fold(0.0, f64::max),
            Self::Segment { p1, p2, .. } => {
                p1.distance(local_point).max(p2.distance(local_point))
            }
        }
    }

    /// Mass properties for this shape at the given density (kg / m^2).
    /// A density of `0` yields the degenerate zero-contribution mass.
    pub fn create_mass(&self, density: f64) -> Mass {
        if density <= 0.0 {
            return Mass::new(self.centroid(), 0.0, 0.0);
        }

        match self {
            Self::Circle { center, radius } => {
                let mass = density * std::f64::consts::PI * radius * radius;
                // Inertia of a disc about its own center, about the origin
                // via the parallel-axis shift below in `Mass::add` callers.
                let inertia = mass * radius * radius * 0.5;
                Mass::new(*center, mass, inertia)
            }
            Self::Polygon { vertices, .. } => polygon_mass(vertices, density),
            // A segment has zero area: it can only ever be part of a static
            // or kinematic body, so it contributes nothing to mass.
            Self::Segment { p1, p2, .. } => Mass::new((*p1 + *p2) * 0.5, 0.0, 0.0),
        }
    }

    /// Local-frame centroid, used as the mass center when density is zero.
    fn centroid(&self) -> Vector2 {
        match self {
            Self::Circle { center, .. } => *center,
            Self::Polygon { vertices, .. } => {
                let sum = vertices
                    .iter()
                    .fold(Vector2::ZERO, |acc, v| acc + *v);
                sum * (1.0 / vertices.len() as f64)
            }
            Self::Segment { p1, p2, .. } => (*p1 + *p2) * 0.5,
        }
    }
}

/// Twice the signed area of a polygon (positive when counter-clockwise).
fn signed_area(points: &[Vector2]) -> f64 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x() * b.y() - b.x() * a.y();
    }
    sum
}

/// Whether every interior angle of a counter-clockwise loop turns left.
fn is_convex(points: &[Vector2]) -> bool {
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).cross(c - b);
        if cross < -f64::EPSILON {
            return false;
        }
    }
    true
}

/// Mass, centroid and inertia of a convex polygon via the standard
/// triangle-fan decomposition about an arbitrary reference point.
fn polygon_mass(vertices: &[Vector2], density: f64) -> Mass {
    let reference = vertices[0];
    let mut area = 0.0;
    let mut center = Vector2::ZERO;
    let mut inertia = 0.0;

    let n = vertices.len();
    for i in 0..n {
        let e1 = vertices[i] - reference;
        let e2 = vertices[(i + 1) % n] - reference;

        let cross = e1.cross(e2);
        let triangle_area = 0.5 * cross;
        area += triangle_area;

        center = center + (e1 + e2) * (triangle_area / 3.0);

        let intx2 = e1.x() * e1.x() + e1.x() * e2.x() + e2.x() * e2.x();
        let inty2 = e1.y() * e1.y() + e1.y() * e2.y() + e2.y() * e2.y();
        inertia += (0.25 / 3.0 * cross) * (intx2 + inty2);
    }

    let mass = density * area;
    let center = if area > f64::EPSILON {
        center * (1.0 / area) + reference
    } else {
        reference
    };

    // Shift the inertia (currently about `reference`) to be about `center`.
    let inertia = density * inertia - mass * (center - reference).length_squared();

    Mass::new(center, mass, inertia)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Shape {
        Shape::rectangle(0.5, 0.5).unwrap()
    }

    #[test]
    fn polygon_rejects_too_few_vertices() {
        let err = Shape::polygon(&[Vector2::ZERO, Vector2::new(1.0, 0.0)]);
        assert!(err.is_err());
    }

    #[test]
    fn polygon_rejects_clockwise_winding() {
        let clockwise = [
            Vector2::new(-0.5, -0.5),
            Vector2::new(-0.5, 0.5),
            Vector2::new(0.5, 0.5),
            Vector2::new(0.5, -0.5),
        ];
        assert!(Shape::polygon(&clockwise).is_err());
    }

    #[test]
    fn circle_rejects_non_positive_radius() {
        assert!(Shape::circle(Vector2::ZERO, 0.0).is_err());
        assert!(Shape::circle(Vector2::ZERO, -1.0).is_err());
    }

    #[test]
    fn segment_rejects_zero_length() {
        let p = Vector2::new(1.0, 1.0);
        assert!(Shape::segment(p, p, Vector2::new(0.0, 1.0)).is_err());
    }

    #[test]
    fn unit_square_mass_matches_closed_form() {
        let mass = unit_square().create_mass(2.0);
        assert!((mass.mass - 2.0).abs() < 1e-9);
        assert!(mass.center.x().abs() < 1e-9);
        // I = m * (w^2 + h^2) / 12 for a 1x1 square.
        let expected_inertia = 2.0 * (1.0 + 1.0) / 12.0;
        assert!((mass.inertia - expected_inertia).abs() < 1e-9);
    }

    #[test]
    fn zero_density_contributes_no_mass() {
        let mass = unit_square().create_mass(0.0);
        assert_eq!(mass.mass, 0.0);
    }

    #[test]
    fn aabb_of_axis_aligned_square_matches_half_extents() {
        let shape = unit_square();
        let aabb = shape.aabb(&Transform::identity());
        assert!((aabb.min.x() + 0.5).abs() < 1e-9);
        assert!((aabb.max.x() - 0.5).abs() < 1e-9);
    }
}
