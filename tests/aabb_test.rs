use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};
use reel_ngin::geometry::{Aabb, Compass};

fn unit_box_at(center: Point3<f32>) -> Aabb {
    let half = Vector3::new(0.5, 0.5, 0.5);
    Aabb::new(center - half, center + half)
}

#[test]
fn should_enclose_all_points() {
    let bounds = Aabb::enclosing([
        Point3::new(1.0, -2.0, 3.0),
        Point3::new(-4.0, 5.0, 0.0),
        Point3::new(2.0, 0.0, -1.0),
    ])
    .expect("non-empty set");

    assert_eq!(bounds.min(), Point3::new(-4.0, -2.0, -1.0));
    assert_eq!(bounds.max(), Point3::new(2.0, 5.0, 3.0));
}

#[test]
fn should_return_none_for_an_empty_point_set() {
    assert!(Aabb::enclosing(std::iter::empty::<Point3<f32>>()).is_none());
}

#[test]
fn should_normalise_swapped_corners() {
    let bounds = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(-1.0, -1.0, -1.0));
    assert_eq!(bounds.min(), Point3::new(-1.0, -1.0, -1.0));
    assert_eq!(bounds.max(), Point3::new(1.0, 1.0, 1.0));
}

#[test]
fn should_intersect_symmetrically_when_overlapping() {
    let a = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    let b = unit_box_at(Point3::new(0.5, 0.5, 0.5));
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn should_not_intersect_when_merely_touching() {
    let a = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    // shares the x = 0.5 face exactly
    let b = unit_box_at(Point3::new(1.0, 0.0, 0.0));
    assert!(!a.intersects(&b));
    assert!(!b.intersects(&a));
}

#[test]
fn should_not_intersect_when_separated() {
    let a = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    let b = unit_box_at(Point3::new(3.0, 0.0, 0.0));
    assert!(!a.intersects(&b));
}

#[test]
fn should_keep_bounds_for_a_near_identity_rotation() {
    let bounds = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
    let rotated = bounds.bounds_if_rotated(Quaternion::from_angle_y(Deg(0.0)));
    assert_eq!(rotated, bounds);
}

#[test]
fn should_swap_extents_for_a_quarter_turn() {
    // 2 wide, 4 deep about y: a quarter turn swaps x and z extents
    let bounds = Aabb::new(Point3::new(-1.0, 0.0, -2.0), Point3::new(1.0, 1.0, 2.0));
    let rotated = bounds.bounds_if_rotated(Quaternion::from_angle_y(Deg(90.0)));

    let size = rotated.size();
    assert!((size.x - 4.0).abs() < 1e-4);
    assert!((size.y - 1.0).abs() < 1e-4);
    assert!((size.z - 2.0).abs() < 1e-4);
    // rotation is about the box's own center
    let center = rotated.center();
    assert!((center.x - 0.0).abs() < 1e-4);
    assert!((center.y - 0.5).abs() < 1e-4);
    assert!((center.z - 0.0).abs() < 1e-4);
}

#[test]
fn should_grow_conservatively_for_a_diagonal_rotation() {
    let bounds = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    let rotated = bounds.bounds_if_rotated(Quaternion::from_angle_y(Deg(45.0)));
    // corners swing out to sqrt(2) on x and z
    assert!(rotated.size().x > bounds.size().x);
    assert!(rotated.size().z > bounds.size().z);
    assert!((rotated.size().y - bounds.size().y).abs() < 1e-4);
}

#[test]
fn should_combine_boxes() {
    let a = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    let b = unit_box_at(Point3::new(4.0, 0.0, 0.0));
    let combined = Aabb::enclosing_boxes(&[a, b]).expect("non-empty");
    assert_eq!(combined.min(), Point3::new(-0.5, -0.5, -0.5));
    assert_eq!(combined.max(), Point3::new(4.5, 0.5, 0.5));
}

#[test]
fn should_list_six_surfaces() {
    let bounds = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    let surfaces = bounds.surfaces();
    assert_eq!(surfaces.len(), 6);
    // every listed corner lies on the box itself
    for quad in &surfaces {
        for corner in quad {
            assert!(corner.x.abs() <= 0.5 + f32::EPSILON);
            assert!(corner.y.abs() <= 0.5 + f32::EPSILON);
            assert!(corner.z.abs() <= 0.5 + f32::EPSILON);
        }
    }
}

#[test]
fn should_classify_the_crossed_wall() {
    let outer = Aabb::new(Point3::new(-5.0, -5.0, -5.0), Point3::new(5.0, 5.0, 5.0));
    let mut inner = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    assert_eq!(inner.escape_direction(&outer), Compass::NoDirection);

    inner.translate(Vector3::new(5.0, 0.0, 0.0));
    assert_eq!(inner.escape_direction(&outer), Compass::East);

    inner.translate(Vector3::new(-10.0, 0.0, 0.0));
    assert_eq!(inner.escape_direction(&outer), Compass::West);
}

#[test]
fn should_scale_about_the_center() {
    let mut bounds = unit_box_at(Point3::new(2.0, -1.0, 0.0));
    bounds.scale(2.0);
    assert_eq!(bounds.center(), Point3::new(2.0, -1.0, 0.0));
    assert_eq!(bounds.size(), Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn should_normalise_after_a_negative_scale() {
    let mut bounds = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    bounds.scale(-3.0);
    assert_eq!(bounds.center(), Point3::new(0.0, 0.0, 0.0));
    assert_eq!(bounds.size(), Vector3::new(3.0, 3.0, 3.0));
    assert!(bounds.min().x < bounds.max().x);
}

#[test]
fn should_move_to_a_new_center() {
    let mut bounds = unit_box_at(Point3::new(0.0, 0.0, 0.0));
    bounds.move_to(Point3::new(3.0, -2.0, 1.0));
    assert_eq!(bounds.center(), Point3::new(3.0, -2.0, 1.0));
    assert_eq!(bounds.size(), Vector3::new(1.0, 1.0, 1.0));
}
