use cgmath::{Deg, Point3, Vector3};
use reel_ngin::camera::{Camera, Projection, frustum};
use reel_ngin::geometry::{Aabb, Plane};

fn unit_box_at(center: Point3<f32>) -> Aabb {
    let half = Vector3::new(0.5, 0.5, 0.5);
    Aabb::new(center - half, center + half)
}

/// Camera at the origin looking down negative z.
fn looking_down_z() -> (Camera, Projection) {
    let camera = Camera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
    let projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
    (camera, projection)
}

#[test]
fn should_accept_boxes_in_front_of_a_plane() {
    let plane = Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
    assert!(plane.is_on_or_forward(&unit_box_at(Point3::new(0.0, 3.0, 0.0))));
    assert!(!plane.is_on_or_forward(&unit_box_at(Point3::new(0.0, -3.0, 0.0))));
}

#[test]
fn should_accept_boxes_straddling_a_plane() {
    let plane = Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
    assert!(plane.is_on_or_forward(&unit_box_at(Point3::new(0.0, 0.0, 0.0))));
}

#[test]
fn should_see_a_box_ahead_of_the_camera() {
    let (camera, projection) = looking_down_z();
    let view = frustum(&camera, &projection);
    assert!(view.intersects(&unit_box_at(Point3::new(0.0, 0.0, -10.0))));
}

#[test]
fn should_cull_a_box_behind_the_camera() {
    let (camera, projection) = looking_down_z();
    let view = frustum(&camera, &projection);
    assert!(!view.intersects(&unit_box_at(Point3::new(0.0, 0.0, 10.0))));
}

#[test]
fn should_cull_a_box_beyond_the_far_plane() {
    let (camera, projection) = looking_down_z();
    let view = frustum(&camera, &projection);
    assert!(!view.intersects(&unit_box_at(Point3::new(0.0, 0.0, -200.0))));
}

#[test]
fn should_cull_a_box_far_off_to_the_side() {
    let (camera, projection) = looking_down_z();
    let view = frustum(&camera, &projection);
    assert!(!view.intersects(&unit_box_at(Point3::new(50.0, 0.0, -10.0))));
}

#[test]
fn should_see_a_large_box_overlapping_an_edge() {
    let (camera, projection) = looking_down_z();
    let view = frustum(&camera, &projection);
    // wide box poking into the right side of the view volume
    let wide = Aabb::new(Point3::new(2.0, -1.0, -11.0), Point3::new(30.0, 1.0, -9.0));
    assert!(view.intersects(&wide));
}
