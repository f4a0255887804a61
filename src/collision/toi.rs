use crate::geometry::Shape;
use crate::math::{Transform, Vector2};
use crate::settings::Settings;

use super::narrowphase::{self, Overlap};

/// Result of a time-of-impact sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Toi {
    /// No impact within `[0, 1]`.
    NoImpact,
    /// Impact at fraction `t` of the interval; separation at `t` was within
    /// the linear tolerance.
    Impact { fraction: f64 },
    /// The iteration budget was exhausted before converging; `fraction` is
    /// the last conservative estimate, accepted as a residual contact.
    Exhausted { fraction: f64 },
}

/// Conservative advancement: find the earliest fraction `t` in `[0, 1]` at
/// which `shape_a` swept from `start_a` to `end_a` first comes within
/// `settings.linear_tolerance` of `shape_b` swept from `start_b` to `end_b`.
///
/// `shape_b`'s sweep lets this double as bullet-vs-static (sweep length
/// zero) and bullet-vs-moving.
pub fn time_of_impact(
    shape_a: &Shape,
    start_a: Transform,
    end_a: Transform,
    shape_b: &Shape,
    start_b: Transform,
    end_b: Transform,
    settings: &Settings,
) -> Toi {
    let mut t = 0.0f64;

    for _ in 0..settings.max_toi_iterations {
        let transform_a = lerp_transform(start_a, end_a, t);
        let transform_b = lerp_transform(start_b, end_b, t);

        let overlap = narrowphase::overlap(shape_a, &transform_a, shape_b, &transform_b, settings);
        let distance = match overlap {
            Overlap::Disjoint { distance, .. } => distance,
            Overlap::Penetrating { .. } => 0.0,
        };

        if distance <= settings.linear_tolerance {
            return Toi::Impact { fraction: t };
        }

        // Bound how fast the two shapes can close the gap over the rest of
        // the interval using their maximum linear+angular speed, then
        // advance `t` by at least enough to consume that distance.
        let closing_speed = max_closing_speed(shape_a, start_a, end_a) + max_closing_speed(shape_b, start_b, end_b);
        if closing_speed <= f64::EPSILON {
            return Toi::NoImpact;
        }

        let dt = (distance / closing_speed).max(1e-4);
        t += dt;
        if t >= 1.0 {
            return Toi::NoImpact;
        }
    }

    Toi::Exhausted { fraction: t }
}

/// Interpolate a transform along a sweep; exposed crate-wide so a CCD
/// rewind can reuse the exact sweep the solver used to find `t`.
pub(crate) fn lerp_transform(start: Transform, end: Transform, t: f64) -> Transform {
    let translation = start.translation + (end.translation - start.translation) * t;
    let rotation = crate::math::Rotation::from_radians(
        start.rotation.angle() + (end.rotation.angle() - start.rotation.angle()) * t,
    );
    Transform::new(translation, rotation)
}

/// Upper bound on how fast any point of `shape` can move over the sweep,
/// combining translation speed and rotation-disc sweep speed.
fn max_closing_speed(shape: &Shape, start: Transform, end: Transform) -> f64 {
    let translation_speed = (end.translation - start.translation).length();
    let angle_delta = (end.rotation.angle() - start.rotation.angle()).abs();
    let radius = shape.farthest_distance_from(Vector2::ZERO);
    translation_speed + angle_delta * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_circle_through_static_wall_reports_impact_before_tunneling() {
        let bullet = Shape::circle(Vector2::ZERO, 0.05).unwrap();
        let wall = Shape::segment(
            Vector2::new(0.0, -1.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
        )
        .unwrap();

        let start = Transform::from_translation(Vector2::new(-1.0, 0.0));
        let end = Transform::from_translation(Vector2::new(15.666, 0.0));
        let wall_transform = Transform::identity();

        let settings = Settings::default();
        let toi = time_of_impact(
            &bullet,
            start,
            end,
            &wall,
            wall_transform,
            wall_transform,
            &settings,
        );

        match toi {
            Toi::Impact { fraction } => assert!(fraction > 0.0 && fraction < 1.0),
            other => panic!("expected an impact before t=1, got {other:?}"),
        }
    }

    #[test]
    fn shapes_that_never_approach_report_no_impact() {
        let a = Shape::circle(Vector2::ZERO, 0.1).unwrap();
        let b = Shape::circle(Vector2::ZERO, 0.1).unwrap();
        let start = Transform::from_translation(Vector2::new(-5.0, 0.0));
        let end = Transform::from_translation(Vector2::new(-4.0, 0.0));
        let other = Transform::from_translation(Vector2::new(5.0, 0.0));

        let settings = Settings::default();
        let toi = time_of_impact(&a, start, end, &b, other, other, &settings);
        assert_eq!(toi, Toi::NoImpact);
    }
}
