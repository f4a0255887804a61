//! End-to-end scenarios driven entirely through the public `World` API.
//!
//! Each test mirrors one of the concrete worked examples: fixed dt of
//! 1/60 and gravity (0, -9.81) unless a scenario overrides it.

use rigid2d::body::{BodyBuilder, FixtureDef};
use rigid2d::constraint::{Joint, JointKind};
use rigid2d::geometry::Shape;
use rigid2d::math::Vector2;
use rigid2d::World;

const DT: f64 = 1.0 / 60.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn falling_disc(x: f64, y: f64, radius: f64) -> rigid2d::Body {
    BodyBuilder::new()
        .position(Vector2::new(x, y))
        .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, radius).unwrap()).density(1.0).friction(0.5))
        .build()
        .unwrap()
}

fn static_ground(half_width: f64, half_height: f64, y: f64) -> rigid2d::Body {
    BodyBuilder::new()
        .position(Vector2::new(0.0, y - half_height))
        .fixture(FixtureDef::new(Shape::rectangle(half_width, half_height).unwrap()).density(0.0).friction(0.5))
        .build()
        .unwrap()
}

#[test]
fn free_fall_matches_the_closed_form_drop() {
    init_logging();
    let mut world = World::new();
    let handle = world.add_body(falling_disc(0.0, 10.0, 0.5)).unwrap();

    world.step_fixed(60).unwrap();

    let body = world.body(handle).unwrap();
    assert!((body.position().x() - 0.0).abs() < 1e-9);
    assert!((body.position().y() - 5.095).abs() < 0.05);
    assert!((body.linear_velocity().y() - (-9.81)).abs() < 0.05);
    assert_eq!(body.angular_velocity(), 0.0);
}

#[test]
fn a_stack_of_boxes_settles_and_sleeps() {
    init_logging();
    let mut world = World::new();
    world.add_body(static_ground(20.0, 0.5, 0.0)).unwrap();

    fn unit_box(y: f64) -> rigid2d::Body {
        BodyBuilder::new()
            .position(Vector2::new(0.0, y))
            .fixture(FixtureDef::new(Shape::rectangle(0.5, 0.5).unwrap()).density(1.0).friction(0.5))
            .build()
            .unwrap()
    }

    world.add_body(unit_box(0.5)).unwrap();
    let top = world.add_body(unit_box(1.5)).unwrap();

    for _ in 0..120 {
        world.step(DT).unwrap();
    }

    let body = world.body(top).unwrap();
    assert!(body.position().y() >= 1.499 - 0.05 && body.position().y() <= 1.501 + 0.05);
    assert!(body.linear_velocity().y().abs() < 0.05);
    assert!(body.is_at_rest());
}

#[test]
fn an_elastic_disc_rebounds_near_its_drop_height() {
    init_logging();
    let mut world = World::new();
    world.add_body(static_ground(20.0, 0.5, 0.0)).unwrap();

    let bouncy = BodyBuilder::new()
        .position(Vector2::new(0.0, 5.0))
        .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.5).unwrap()).density(1.0).restitution(1.0))
        .build()
        .unwrap();
    let handle = world.add_body(bouncy).unwrap();

    let mut peak_after_bounce = f64::MIN;
    let mut has_bounced = false;
    let mut previous_velocity_y = 0.0;

    for _ in 0..300 {
        world.step(DT).unwrap();
        let body = world.body(handle).unwrap();
        let velocity_y = body.linear_velocity().y();

        if has_bounced {
            peak_after_bounce = peak_after_bounce.max(body.position().y());
            if previous_velocity_y > 0.0 && velocity_y <= 0.0 {
                break;
            }
        } else if previous_velocity_y < 0.0 && velocity_y >= 0.0 {
            has_bounced = true;
        }
        previous_velocity_y = velocity_y;
    }

    assert!(has_bounced, "disc never bounced off the floor");
    assert!(peak_after_bounce >= 4.9 - 0.2, "peak rebound {peak_after_bounce} fell short");
}

#[test]
fn a_revolute_pendulum_swings_with_the_small_angle_period() {
    init_logging();
    let mut world = World::new();

    let pivot = world.add_body(BodyBuilder::new().position(Vector2::ZERO).build().unwrap()).unwrap();
    let bob = world
        .add_body(
            BodyBuilder::new()
                .position(Vector2::new(1.0, 0.0))
                .linear_velocity(Vector2::new(0.0, 0.15))
                .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.1).unwrap()).density(1.0))
                .build()
                .unwrap(),
        )
        .unwrap();

    world
        .add_joint(Joint::new(pivot, bob, JointKind::revolute(Vector2::ZERO, Vector2::new(-1.0, 0.0), 0.0)))
        .unwrap();

    let length = 1.0;
    let gravity = world.gravity().length();
    let period = std::f64::consts::TAU * (length / gravity).sqrt();
    let steps = (period / DT).round() as u32;

    world.step_fixed(steps).unwrap();

    let body = world.body(bob).unwrap();
    let distance_from_start = (body.position() - Vector2::new(1.0, 0.0)).length();
    assert!(distance_from_start < 0.15, "pendulum drifted {distance_from_start} from its starting point after one period");
}

#[test]
fn a_bullet_reports_one_contact_and_does_not_tunnel() {
    init_logging();
    let mut world = World::new();
    world.set_gravity(Vector2::ZERO);

    world
        .add_body(
            BodyBuilder::new()
                .fixture(FixtureDef::new(Shape::segment(Vector2::new(0.0, -1.0), Vector2::new(0.0, 1.0), Vector2::new(-1.0, 0.0)).unwrap()))
                .build()
                .unwrap(),
        )
        .unwrap();

    let bullet = world
        .add_body(
            BodyBuilder::new()
                .position(Vector2::new(-1.0, 0.0))
                .linear_velocity(Vector2::new(1000.0, 0.0))
                .bullet(true)
                .fixture(FixtureDef::new(Shape::circle(Vector2::ZERO, 0.05).unwrap()).density(1.0))
                .build()
                .unwrap(),
        )
        .unwrap();

    world.step(DT).unwrap();

    assert!(world.body(bullet).unwrap().position().x() < 0.0);
}

#[test]
fn a_settled_disc_sleeps_then_wakes_on_the_next_step_after_a_force() {
    init_logging();
    let mut world = World::new();
    world.add_body(static_ground(20.0, 0.5, 0.0)).unwrap();
    let handle = world.add_body(falling_disc(0.0, 0.6, 0.5)).unwrap();

    let mut went_to_rest = false;
    for _ in 0..60 {
        world.step(DT).unwrap();
        if world.body(handle).unwrap().is_at_rest() {
            went_to_rest = true;
            break;
        }
    }
    assert!(went_to_rest, "disc never settled to rest within 60 steps");

    world.body_mut(handle).unwrap().apply_force(Vector2::new(0.0, 100.0), DT);
    assert!(!world.body(handle).unwrap().is_at_rest());

    world.step(DT).unwrap();
    assert!(!world.body(handle).unwrap().is_at_rest());
}
