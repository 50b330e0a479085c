#![allow(clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use glam::DQuat;

use super::*;

fn unit_box() -> Aabb {
    Aabb::centered(DVec3::splat(1.0))
}

#[test]
fn ray_new_normalizes_direction() {
    let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -5.0)).unwrap();
    assert_eq!(ray.dir, DVec3::NEG_Z);
    assert_eq!(ray.at(2.0), DVec3::new(0.0, 0.0, -2.0));
}

#[test]
fn ray_new_rejects_zero_direction() {
    assert!(Ray::new(DVec3::ONE, DVec3::ZERO).is_none());
}

#[test]
fn box_intersect_reports_entry_distance() {
    let t = unit_box().intersect(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z).unwrap();
    assert!((t - 9.0).abs() < 1e-12);
}

#[test]
fn box_intersect_from_inside_is_zero() {
    assert_eq!(unit_box().intersect(DVec3::ZERO, DVec3::X), Some(0.0));
}

#[test]
fn box_intersect_misses_parallel_ray_outside_slab() {
    assert!(unit_box().intersect(DVec3::new(0.0, 5.0, 10.0), DVec3::NEG_Z).is_none());
}

#[test]
fn box_intersect_misses_box_behind_origin() {
    assert!(unit_box().intersect(DVec3::new(0.0, 0.0, 10.0), DVec3::Z).is_none());
}

#[test]
fn empty_box_is_never_hit() {
    assert!(Aabb::empty().intersect(DVec3::ZERO, DVec3::X).is_none());
}

#[test]
fn grow_covers_points() {
    let mut a = Aabb::empty();
    assert!(a.is_empty());
    a.grow(DVec3::new(1.0, 2.0, 3.0));
    a.grow(DVec3::new(-1.0, 0.0, 5.0));
    assert_eq!(a.size(), DVec3::new(2.0, 2.0, 2.0));
    assert_eq!(a.center(), DVec3::new(0.0, 1.0, 4.0));
}

#[test]
fn transformed_box_contains_rotated_corners() {
    let b = Aabb::new(DVec3::new(-2.0, 0.0, -1.0), DVec3::new(2.0, 1.0, 1.0));
    let t = DAffine3::from_rotation_y(FRAC_PI_2);
    let out = b.transformed(&t);
    assert!((out.size().x - 2.0).abs() < 1e-9);
    assert!((out.size().z - 4.0).abs() < 1e-9);
}

#[test]
fn ray_hits_rotated_long_box() {
    // A 10 long, 1 thick box turned 90° now extends along Z.
    let local = Aabb::centered(DVec3::new(5.0, 1.0, 0.5));
    let transform = DAffine3::from_rotation_translation(DQuat::from_rotation_y(FRAC_PI_2), DVec3::ZERO);
    let ray = Ray::new(DVec3::new(10.0, 0.0, 4.0), DVec3::NEG_X).unwrap();
    let t = ray_hits_box(&ray, &transform, &local).unwrap();
    assert!((t - 9.5).abs() < 1e-9);
}

#[test]
fn ray_hits_scaled_box_in_world_units() {
    let local = unit_box();
    let transform = DAffine3::from_scale(DVec3::splat(10.0));
    let ray = Ray::new(DVec3::new(0.0, 0.0, 50.0), DVec3::NEG_Z).unwrap();
    let t = ray_hits_box(&ray, &transform, &local).unwrap();
    assert!((t - 40.0).abs() < 1e-9);
}

#[test]
fn degenerate_transform_is_never_hit() {
    let transform = DAffine3::from_scale(DVec3::ZERO);
    let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z).unwrap();
    assert!(ray_hits_box(&ray, &transform, &unit_box()).is_none());
}

#[test]
fn plane_hit_from_above() {
    let ray = Ray::new(DVec3::new(3.0, 10.0, -2.0), DVec3::new(1.0, -1.0, 0.0)).unwrap();
    let p = ray_hits_plane_y(&ray, 0.0).unwrap();
    assert!((p.x - 13.0).abs() < 1e-9);
    assert_eq!(p.y, 0.0);
    assert!((p.z + 2.0).abs() < 1e-9);
}

#[test]
fn plane_parallel_or_away_misses() {
    let flat = Ray::new(DVec3::new(0.0, 10.0, 0.0), DVec3::X).unwrap();
    assert!(ray_hits_plane_y(&flat, 0.0).is_none());
    let up = Ray::new(DVec3::new(0.0, 10.0, 0.0), DVec3::Y).unwrap();
    assert!(ray_hits_plane_y(&up, 0.0).is_none());
}

#[test]
fn point_segment_distance_cases() {
    let (a, b) = (DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
    assert_eq!(point_segment_distance(DVec2::new(5.0, 3.0), a, b), 3.0);
    assert_eq!(point_segment_distance(DVec2::new(13.0, 4.0), a, b), 5.0);
    assert_eq!(point_segment_distance(DVec2::new(3.0, 4.0), a, a), 5.0);
}
