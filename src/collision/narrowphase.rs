use crate::geometry::Shape;
use crate::math::{Transform, Vector2};
use crate::settings::Settings;

/// Outcome of a narrow-phase test between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    /// No overlap; `axis` is a separating axis (world space, pointing from
    /// A to B) and `distance` the (positive) gap along it.
    Disjoint { axis: Vector2, distance: f64 },
    /// Shapes interpenetrate along `normal` (world space, pointing from A
    /// to B) by `depth`.
    Penetrating { normal: Vector2, depth: f64 },
}

/// Test two shapes for overlap.
///
/// `project`/`separated`/`overlap` work on arbitrary convex shapes once the
/// axis list includes both shapes' face normals. Circle pairs and
/// circle-vs-anything use closed-form fast paths instead.
pub fn overlap(
    shape_a: &Shape,
    transform_a: &Transform,
    shape_b: &Shape,
    transform_b: &Transform,
    settings: &Settings,
) -> Overlap {
    match (shape_a, shape_b) {
        (Shape::Circle { .. }, Shape::Circle { .. }) => {
            circle_circle(shape_a, transform_a, shape_b, transform_b)
        }
        // `circle_vs_convex(circle, convex)` returns its normal pointing
        // from the circle toward the convex shape, i.e. already "A to B"
        // when the circle is the first argument; flip when it's the second.
        (Shape::Circle { .. }, _) => circle_vs_convex(shape_a, transform_a, shape_b, transform_b, settings),
        (_, Shape::Circle { .. }) => {
            let flipped = circle_vs_convex(shape_b, transform_b, shape_a, transform_a, settings);
            flip(flipped)
        }
        _ => sat(shape_a, transform_a, shape_b, transform_b, settings),
    }
}

fn flip(overlap: Overlap) -> Overlap {
    match overlap {
        Overlap::Disjoint { axis, distance } => Overlap::Disjoint {
            axis: -axis,
            distance,
        },
        Overlap::Penetrating { normal, depth } => Overlap::Penetrating {
            normal: -normal,
            depth,
        },
    }
}

fn circle_circle(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Overlap {
    let (Shape::Circle { center: ca, radius: ra }, Shape::Circle { center: cb, radius: rb }) =
        (a, b)
    else {
        unreachable!("circle_circle called with non-circle shape")
    };

    let world_a = ta.apply(*ca);
    let world_b = tb.apply(*cb);
    let delta = world_b - world_a;
    let distance = delta.length();
    let radius_sum = ra + rb;

    if distance >= radius_sum {
        let axis = if distance > f64::EPSILON {
            delta * (1.0 / distance)
        } else {
            Vector2::new(1.0, 0.0)
        };
        Overlap::Disjoint {
            axis,
            distance: distance - radius_sum,
        }
    } else {
        let normal = if distance > f64::EPSILON {
            delta * (1.0 / distance)
        } else {
            Vector2::new(1.0, 0.0)
        };
        Overlap::Penetrating {
            normal,
            depth: radius_sum - distance,
        }
    }
}

/// Circle (`circle_shape`/`circle_transform`) against any convex shape.
fn circle_vs_convex(
    circle_shape: &Shape,
    circle_transform: &Transform,
    convex_shape: &Shape,
    convex_transform: &Transform,
    settings: &Settings,
) -> Overlap {
    let Shape::Circle { center, radius } = circle_shape else {
        unreachable!("circle_vs_convex called with non-circle shape")
    };
    let world_center = circle_transform.apply(*center);

    // Closest point on the convex shape to the circle center, via support in
    // the direction from the convex shape's centroid-ish reference (any
    // vertex works as a seed since we fall back to full vertex scan).
    let toward_circle = world_center - convex_transform.translation;
    let closest = closest_point_on_convex(convex_shape, convex_transform, world_center, toward_circle);

    let delta = world_center - closest;
    let distance = delta.length();

    if distance >= *radius {
        let axis = if distance > f64::EPSILON {
            (-delta) * (1.0 / distance)
        } else {
            Vector2::new(1.0, 0.0)
        };
        Overlap::Disjoint {
            axis,
            distance: distance - radius,
        }
    } else if distance > settings.linear_tolerance {
        let normal = (-delta) * (1.0 / distance);
        Overlap::Penetrating {
            normal,
            depth: radius - distance,
        }
    } else {
        // Circle center is inside (or on) the convex shape: push out along
        // the nearest face normal instead of an ill-defined center delta.
        let (normal, face_distance) = nearest_face(convex_shape, convex_transform, world_center);
        Overlap::Penetrating {
            normal: -normal,
            depth: radius - face_distance,
        }
    }
}

fn closest_point_on_convex(
    shape: &Shape,
    transform: &Transform,
    point: Vector2,
    _seed_direction: Vector2,
) -> Vector2 {
    match shape {
        Shape::Polygon { .. } => {
            let vertices = shape.vertices(transform);
            let normals = shape.normals(transform);
            let n = vertices.len();
            for i in 0..n {
                let v = vertices[i];
                let normal = normals[i];
                if normal.dot(point - v) > 0.0 {
                    let next = vertices[(i + 1) % n];
                    return closest_point_on_segment(v, next, point);
                }
            }
            // Point is inside; return the point itself, callers treat this
            // as the degenerate "inside" case via the distance check above.
            point
        }
        Shape::Segment { p1, p2, .. } => {
            closest_point_on_segment(transform.apply(*p1), transform.apply(*p2), point)
        }
        Shape::Circle { center, .. } => transform.apply(*center),
    }
}

fn closest_point_on_segment(a: Vector2, b: Vector2, point: Vector2) -> Vector2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

fn nearest_face(shape: &Shape, transform: &Transform, point: Vector2) -> (Vector2, f64) {
    let vertices = shape.vertices(transform);
    let normals = shape.normals(transform);
    let mut best = (normals[0], f64::MIN);
    for (v, n) in vertices.iter().zip(normals.iter()) {
        let d = n.dot(point - *v);
        if d > best.1 {
            best = (*n, d);
        }
    }
    best
}

fn sat(shape_a: &Shape, ta: &Transform, shape_b: &Shape, tb: &Transform, settings: &Settings) -> Overlap {
    let normals_a = shape_a.normals(ta);
    let normals_b = shape_b.normals(tb);

    let mut best_depth = f64::MAX;
    let mut best_axis = Vector2::new(1.0, 0.0);

    for axis in normals_a.iter().chain(normals_b.iter()) {
        let (min_a, max_a) = shape_a.project(ta, *axis);
        let (min_b, max_b) = shape_b.project(tb, *axis);

        if max_a < min_b - settings.linear_tolerance || max_b < min_a - settings.linear_tolerance {
            let distance = (min_b - max_a).max(min_a - max_b);
            return Overlap::Disjoint {
                axis: *axis,
                distance,
            };
        }

        let depth = (max_a.min(max_b)) - (min_a.max(min_b));
        if depth < best_depth {
            best_depth = depth;
            best_axis = *axis;
        }
    }

    // Ensure the chosen axis points from A toward B.
    let center_a = ta.apply(shape_centroid(shape_a));
    let center_b = tb.apply(shape_centroid(shape_b));
    if best_axis.dot(center_b - center_a) < 0.0 {
        best_axis = -best_axis;
    }

    Overlap::Penetrating {
        normal: best_axis,
        depth: best_depth,
    }
}

fn shape_centroid(shape: &Shape) -> Vector2 {
    match shape {
        Shape::Circle { center, .. } => *center,
        Shape::Polygon { vertices, .. } => {
            let sum = vertices.iter().fold(Vector2::ZERO, |acc, v| acc + *v);
            sum * (1.0 / vertices.len() as f64)
        }
        Shape::Segment { p1, p2, .. } => (*p1 + *p2) * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn separated_circles_report_disjoint() {
        let a = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let b = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(5.0, 0.0));

        match overlap(&a, &ta, &b, &tb, &settings()) {
            Overlap::Disjoint { distance, .. } => assert!((distance - 4.0).abs() < 1e-9),
            other => panic!("expected disjoint, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_circles_report_penetration() {
        let a = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let b = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(0.5, 0.0));

        match overlap(&a, &ta, &b, &tb, &settings()) {
            Overlap::Penetrating { depth, normal } => {
                assert!((depth - 0.5).abs() < 1e-9);
                assert!((normal.x() - 1.0).abs() < 1e-9);
            }
            other => panic!("expected penetration, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_squares_report_axis_aligned_normal() {
        let a = Shape::rectangle(0.5, 0.5).unwrap();
        let b = Shape::rectangle(0.5, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(0.8, 0.0));

        match overlap(&a, &ta, &b, &tb, &settings()) {
            Overlap::Penetrating { depth, normal } => {
                assert!((depth - 0.2).abs() < 1e-9);
                assert!(normal.x() > 0.0);
            }
            other => panic!("expected penetration, got {other:?}"),
        }
    }
}
