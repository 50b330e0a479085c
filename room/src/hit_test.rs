use std::sync::Arc;

use super::*;
use crate::assets::{ModelAsset, ModelRef};
use crate::geom::Aabb;
use crate::grid::{Layout, WallSegment};
use crate::objects::PlacedObject;
use crate::scene::build;

fn l_shape() -> Scene {
    build(&Layout::from_walls(vec![WallSegment::new(0, 0, 100, 0), WallSegment::new(100, 0, 100, 100)]))
}

fn cube_object(x: f64, z: f64) -> PlacedObject {
    let asset = ModelAsset {
        source: "cube.glb".into(),
        bounds: Aabb::new(DVec3::new(-0.5, 0.0, -0.5), DVec3::new(0.5, 1.0, 0.5)),
        primitive_count: 1,
    };
    let mut obj = PlacedObject::new(ModelRef::new("cube"), Arc::new(asset), 40.0);
    obj.set_floor_position(x, z);
    obj
}

fn ray(origin: DVec3, dir: DVec3) -> Ray {
    Ray::new(origin, dir).unwrap()
}

#[test]
fn ray_hits_front_face_of_wall() {
    let hit = raycast_walls(&ray(DVec3::new(0.0, 125.0, 500.0), DVec3::NEG_Z), &l_shape()).unwrap();
    assert_eq!(hit.wall, WallId(0));
    assert!((hit.distance - 545.0).abs() < 1e-9);
}

#[test]
fn ray_hits_rotated_wall() {
    let hit = raycast_walls(&ray(DVec3::new(500.0, 125.0, 0.0), DVec3::NEG_X), &l_shape()).unwrap();
    assert_eq!(hit.wall, WallId(1));
    assert!((hit.distance - 445.0).abs() < 1e-9);
}

#[test]
fn nearest_wall_wins() {
    // From the far side both walls lie on the ray; wall 1 is closer.
    let hit = raycast_walls(&ray(DVec3::new(500.0, 125.0, -50.0), DVec3::NEG_X), &l_shape()).unwrap();
    assert_eq!(hit.wall, WallId(1));
}

#[test]
fn ray_over_the_walls_misses() {
    assert!(raycast_walls(&ray(DVec3::new(0.0, 300.0, 500.0), DVec3::NEG_Z), &l_shape()).is_none());
}

#[test]
fn empty_scene_never_hits() {
    assert!(raycast_walls(&ray(DVec3::ZERO, DVec3::X), &Scene::empty()).is_none());
}

#[test]
fn object_hit_uses_scaled_bounds() {
    let mut store = ObjectStore::new();
    let id = store.insert(cube_object(0.0, 0.0));
    // Scaled cube spans y in [0, 40].
    let hit = raycast_objects(&ray(DVec3::new(0.0, 30.0, 200.0), DVec3::NEG_Z), &store).unwrap();
    assert_eq!(hit.id, id);
    assert!((hit.distance - 180.0).abs() < 1e-9);
    assert!(raycast_objects(&ray(DVec3::new(0.0, 50.0, 200.0), DVec3::NEG_Z), &store).is_none());
}

#[test]
fn nearest_object_wins() {
    let mut store = ObjectStore::new();
    store.insert(cube_object(0.0, -100.0));
    let near = store.insert(cube_object(0.0, 100.0));
    let hit = raycast_objects(&ray(DVec3::new(0.0, 10.0, 500.0), DVec3::NEG_Z), &store).unwrap();
    assert_eq!(hit.id, near);
}

#[test]
fn floor_point_from_camera() {
    let p = floor_point(&ray(DVec3::new(0.0, 100.0, 0.0), DVec3::new(1.0, -1.0, 0.0))).unwrap();
    assert!((p.x - 100.0).abs() < 1e-9);
    assert_eq!(p.y, FLOOR_LEVEL);
}
