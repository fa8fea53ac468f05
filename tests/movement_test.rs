use cgmath::{InnerSpace, Point3, Vector3, Vector4};
use reel_ngin::EngineError;
use reel_ngin::geometry::{Aabb, Compass, shapes};
use reel_ngin::movement::MoveController;
use reel_ngin::particles::Particles;

fn unit_box() -> Aabb {
    Aabb::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
}

fn room() -> Aabb {
    Aabb::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0))
}

#[test]
fn should_start_centered_on_the_initial_position() {
    let controller = MoveController::new(
        unit_box(),
        Point3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0),
    );
    assert_eq!(controller.bounds().center(), Point3::new(2.0, 3.0, 4.0));
    assert_eq!(controller.translate_vector(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_accumulate_translation_while_advancing() {
    let mut controller = MoveController::new(
        unit_box(),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 2.0, 0.0),
    );
    controller.advance(Vector3::new(0.5, 0.5, 0.5));
    controller.advance(Vector3::new(0.5, 0.5, 0.5));
    assert_eq!(controller.translate_vector(), Vector3::new(1.0, 2.0, 0.0));
}

#[test]
fn should_reflect_the_x_direction_off_the_east_wall() {
    let mut controller = MoveController::new(
        unit_box(),
        Point3::new(9.8, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
    );
    controller.advance(Vector3::new(1.0, 1.0, 1.0));
    let wall = controller.bounce_if_collided(&room());
    assert_eq!(wall, Compass::East);
    assert_eq!(controller.direction(), Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn should_reflect_the_z_direction_off_the_near_wall() {
    let mut controller = MoveController::new(
        unit_box(),
        Point3::new(0.0, 0.0, -9.8),
        Vector3::new(0.0, 0.0, -1.0),
    );
    controller.advance(Vector3::new(1.0, 1.0, 1.0));
    let wall = controller.bounce_if_collided(&room());
    assert_eq!(wall, Compass::Out);
    assert_eq!(controller.direction(), Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn should_clamp_back_inside_after_a_deep_penetration() {
    // spawned two units past the east wall, still heading east
    let mut controller = MoveController::new(
        unit_box(),
        Point3::new(12.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
    );

    assert_eq!(controller.bounce_if_collided(&room()), Compass::East);
    assert_eq!(controller.bounds().max().x, 10.0);
    assert_eq!(controller.direction(), Vector3::new(-1.0, 0.0, 0.0));

    // the bounce re-contained the box, so the next check is a clean miss
    // and the direction stays reflected instead of flipping back
    assert_eq!(controller.bounce_if_collided(&room()), Compass::NoDirection);
    assert_eq!(controller.direction(), Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn should_not_bounce_while_inside() {
    let mut controller = MoveController::new(
        unit_box(),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 1.0),
    );
    controller.advance(Vector3::new(0.1, 0.1, 0.1));
    assert_eq!(controller.bounce_if_collided(&room()), Compass::NoDirection);
    assert_eq!(controller.direction(), Vector3::new(1.0, 1.0, 1.0));
}

#[test]
fn should_default_the_colour_divisor_to_cover_the_cloud() {
    let mut particles = Particles::with_v3(shapes::fibonacci_sphere(10, 1.0));
    particles
        .set_colours(
            vec![
                Vector4::new(1.0, 0.0, 0.0, 1.0),
                Vector4::new(0.0, 1.0, 0.0, 1.0),
                Vector4::new(0.0, 0.0, 1.0, 1.0),
            ],
            None,
        )
        .expect("colours");
    // ceil(10 / 3) = 4 particles per colour
    assert_eq!(particles.colour_divisor(), 4);
    assert_eq!(particles.colour_for(0), Vector4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(particles.colour_for(4), Vector4::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(particles.colour_for(9), Vector4::new(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn should_respect_an_explicit_colour_divisor() {
    let mut particles = Particles::with_v3(shapes::fibonacci_sphere(10, 1.0));
    particles
        .set_colours(
            vec![
                Vector4::new(1.0, 0.0, 0.0, 1.0),
                Vector4::new(0.0, 1.0, 0.0, 1.0),
            ],
            Some(2),
        )
        .expect("colours");
    assert_eq!(particles.colour_divisor(), 2);
    // the last colour covers everything past the list
    assert_eq!(particles.colour_for(9), Vector4::new(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn should_reject_colours_before_positions() {
    let mut particles = Particles::default();
    let err = particles
        .set_colours(vec![Vector4::new(1.0, 1.0, 1.0, 1.0)], None)
        .unwrap_err();
    assert_eq!(err, EngineError::ColoursBeforePositions);
}

#[test]
fn should_generate_points_on_the_sphere_surface() {
    let points = shapes::fibonacci_sphere(64, 2.5);
    assert_eq!(points.len(), 64);
    for p in &points {
        assert!((p.magnitude() - 2.5).abs() < 1e-4);
    }
}

#[test]
fn should_close_the_circle_outline() {
    let points = shapes::circle(16, 1.0);
    assert_eq!(points.len(), 17);
    let gap = points[0] - points[16];
    assert!(gap.magnitude() < 1e-5);
    for p in &points {
        assert!((p.truncate().magnitude() - 1.0).abs() < 1e-5);
        assert_eq!(p.z, 0.0);
    }
}

#[test]
fn should_lay_the_rectangle_out_as_a_strip() {
    let points = shapes::rectangle(
        cgmath::Vector2::new(2.0, 1.0),
        cgmath::Vector2::new(-1.0, -0.5),
    );
    assert_eq!(points.len(), 4);
    assert_eq!(points[0], Vector3::new(-1.0, -0.5, 0.0));
    assert_eq!(points[3], Vector3::new(1.0, 0.5, 0.0));
}
