use arrayvec::ArrayVec;

use crate::geometry::{Shape, MAX_POLYGON_VERTICES};
use crate::math::{Transform, Vector2};
use crate::settings::Settings;

use super::narrowphase::{self, Overlap};

/// Identifies a contact point across frames so the solver can carry over
/// accumulated impulses (warm-starting) as long as the same feature pair
/// keeps producing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// Clipped point: (reference edge index, incident vertex index).
    EdgeVertex(usize, usize),
    /// Vertex-vertex contact (circle-circle, circle-polygon, segment ends).
    VertexVertex(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    pub world_point: Vector2,
    pub depth: f64,
    pub feature: FeatureId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    /// World-space normal, pointing from shape A toward shape B.
    pub normal: Vector2,
    pub points: ArrayVec<ManifoldPoint, 2>,
}

impl Manifold {
    fn single(normal: Vector2, point: Vector2, depth: f64, feature: FeatureId) -> Self {
        let mut points = ArrayVec::new();
        points.push(ManifoldPoint {
            world_point: point,
            depth,
            feature,
        });
        Self { normal, points }
    }
}

/// Build a contact manifold for two overlapping shapes.
///
/// A pure function from inputs to an owned result; no shared mutable state.
pub fn build(
    shape_a: &Shape,
    transform_a: &Transform,
    shape_b: &Shape,
    transform_b: &Transform,
    settings: &Settings,
) -> Option<Manifold> {
    let overlap = narrowphase::overlap(shape_a, transform_a, shape_b, transform_b, settings);
    let Overlap::Penetrating { normal, depth } = overlap else {
        return None;
    };
    if depth < -settings.linear_tolerance {
        return None;
    }

    match (shape_a, shape_b) {
        (Shape::Circle { center: ca, .. }, Shape::Circle { center: cb, .. }) => {
            let pa = transform_a.apply(*ca);
            let pb = transform_b.apply(*cb);
            let point = pa + (pb - pa) * 0.5;
            Some(Manifold::single(normal, point, depth, FeatureId::VertexVertex(0, 0)))
        }
        (Shape::Circle { center, .. }, _) => {
            let point = transform_a.apply(*center) + normal * circle_offset(shape_a, *center);
            Some(Manifold::single(normal, point, depth, FeatureId::VertexVertex(0, 0)))
        }
        (_, Shape::Circle { center, .. }) => {
            let point = transform_b.apply(*center) - normal * circle_offset(shape_b, *center);
            Some(Manifold::single(normal, point, depth, FeatureId::VertexVertex(0, 0)))
        }
        (Shape::Segment { .. }, Shape::Segment { .. }) => {
            // Two segments only ever meet at a single point in this engine
            // (both bodies are expected to be static/kinematic); report the
            // deepest-projection endpoint as a conservative single contact.
            let mid = (transform_a.apply(shape_centroid(shape_a))
                + transform_b.apply(shape_centroid(shape_b)))
                * 0.5;
            Some(Manifold::single(normal, mid, depth, FeatureId::VertexVertex(0, 0)))
        }
        _ => clip_polygons(shape_a, transform_a, shape_b, transform_b, normal, depth),
    }
}

fn circle_offset(circle_shape: &Shape, _center: Vector2) -> f64 {
    match circle_shape {
        Shape::Circle { radius, .. } => *radius,
        _ => 0.0,
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

/// Clip the incident edge of `shape_b` against the side planes of the
/// reference edge chosen from whichever shape's face normal is closest to
/// the separating axis.
fn clip_polygons(
    shape_a: &Shape,
    ta: &Transform,
    shape_b: &Shape,
    tb: &Transform,
    normal: Vector2,
    depth: f64,
) -> Option<Manifold> {
    let verts_a = shape_a.vertices(ta);
    let norms_a = shape_a.normals(ta);
    let verts_b = shape_b.vertices(tb);
    let norms_b = shape_b.normals(tb);

    let best_index = |normals: &ArrayVec<Vector2, MAX_POLYGON_VERTICES>| -> usize {
        normals
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.dot(normal).partial_cmp(&b.dot(normal)).unwrap())
            .map(|(i, _)| i)
            .unwrap()
    };

    let a_axis_alignment = norms_a
        .iter()
        .map(|n| n.dot(normal))
        .fold(f64::MIN, f64::max);
    let b_axis_alignment = norms_b
        .iter()
        .map(|n| (-*n).dot(normal))
        .fold(f64::MIN, f64::max);

    let (ref_verts, ref_norms, ref_index, inc_verts, flip, is_a_reference) =
        if a_axis_alignment >= b_axis_alignment {
            let idx = best_index(&norms_a);
            (&verts_a, &norms_a, idx, &verts_b, false, true)
        } else {
            let idx = best_index(&norms_b);
            (&verts_b, &norms_b, idx, &verts_a, true, false)
        };

    let ref_n = ref_verts.len();
    let v1 = ref_verts[ref_index];
    let v2 = ref_verts[(ref_index + 1) % ref_n];
    let ref_normal = ref_norms[ref_index];
    let tangent = (v2 - v1).normalized();

    // Incident edge: the edge of the other shape most anti-parallel to the
    // reference normal.
    let inc_n = inc_verts.len();
    let inc_normals = if is_a_reference { &norms_b } else { &norms_a };
    let incident_index = inc_normals
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.dot(ref_normal).partial_cmp(&b.dot(ref_normal)).unwrap())
        .map(|(i, _)| i)
        .unwrap();

    let i1 = inc_verts[incident_index];
    let i2 = inc_verts[(incident_index + 1) % inc_n];

    let mut points: ArrayVec<(Vector2, usize), 2> = ArrayVec::new();
    points.push((i1, incident_index));
    points.push((i2, (incident_index + 1) % inc_n));

    let clip = |points: ArrayVec<(Vector2, usize), 2>, plane_point: Vector2, plane_normal: Vector2| -> ArrayVec<(Vector2, usize), 2> {
        let mut out = ArrayVec::new();
        let [(p1, id1), (p2, id2)] = match points.into_inner() {
            Ok(arr) => arr,
            Err(_) => return out,
        };
        let d1 = plane_normal.dot(p1 - plane_point);
        let d2 = plane_normal.dot(p2 - plane_point);

        if d1 <= 0.0 {
            out.push((p1, id1));
        }
        if d2 <= 0.0 {
            out.push((p2, id2));
        }
        if d1 * d2 < 0.0 {
            let t = d1 / (d1 - d2);
            let point = p1 + (p2 - p1) * t;
            out.push((point, usize::MAX));
        }
        out
    };

    let side1_normal = -tangent;
    let side1_point = v1;
    points = clip(points, side1_point, side1_normal);
    if points.len() < 2 {
        return build_degenerate(points, ref_normal, depth, ref_index);
    }

    let side2_normal = tangent;
    let side2_point = v2;
    points = clip(points, side2_point, side2_normal);

    let mut manifold_points = ArrayVec::new();
    for (point, incident_vertex) in points {
        let separation = ref_normal.dot(point - v1);
        if separation <= 0.0 {
            let feature = if incident_vertex == usize::MAX {
                FeatureId::EdgeVertex(ref_index, inc_n)
            } else {
                FeatureId::EdgeVertex(ref_index, incident_vertex)
            };
            manifold_points.push(ManifoldPoint {
                world_point: point,
                depth: -separation,
                feature,
            });
        }
    }

    if manifold_points.is_empty() {
        return None;
    }

    let final_normal = if flip { -ref_normal } else { ref_normal };
    Some(Manifold {
        normal: final_normal,
        points: manifold_points,
    })
}

fn build_degenerate(
    points: ArrayVec<(Vector2, usize), 2>,
    ref_normal: Vector2,
    depth: f64,
    ref_index: usize,
) -> Option<Manifold> {
    let (point, vertex) = *points.first()?;
    Some(Manifold::single(
        ref_normal,
        point,
        depth,
        FeatureId::EdgeVertex(ref_index, vertex),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_squares_produce_two_point_manifold() {
        let a = Shape::rectangle(0.5, 0.5).unwrap();
        let b = Shape::rectangle(0.5, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(0.8, 0.0));

        let manifold = build(&a, &ta, &b, &tb, &Settings::default()).unwrap();
        assert_eq!(manifold.points.len(), 2);
        for p in &manifold.points {
            assert!(p.depth > 0.0);
        }
    }

    #[test]
    fn overlapping_circles_produce_one_point_manifold() {
        let a = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let b = Shape::circle(Vector2::ZERO, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(0.5, 0.0));

        let manifold = build(&a, &ta, &b, &tb, &Settings::default()).unwrap();
        assert_eq!(manifold.points.len(), 1);
    }

    #[test]
    fn separated_shapes_produce_no_manifold() {
        let a = Shape::rectangle(0.5, 0.5).unwrap();
        let b = Shape::rectangle(0.5, 0.5).unwrap();
        let ta = Transform::identity();
        let tb = Transform::from_translation(Vector2::new(5.0, 0.0));

        assert!(build(&a, &ta, &b, &tb, &Settings::default()).is_none());
    }
}
