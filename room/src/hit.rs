//! Ray-cast hit testing against walls, placed objects and the floor plane.
//!
//! A miss is `None`, never an error.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use glam::DVec3;

use crate::consts::FLOOR_LEVEL;
use crate::geom::{Ray, ray_hits_box, ray_hits_plane_y};
use crate::objects::{ObjectId, ObjectStore};
use crate::scene::{Scene, WallId};

/// Nearest wall along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub wall: WallId,
    pub distance: f64,
}

/// Nearest placed object along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectHit {
    pub id: ObjectId,
    pub distance: f64,
}

/// First wall the ray enters. Each wall's cached `world_bounds` is tested
/// first; only walls whose bounds the ray enters get the oriented box test.
#[must_use]
pub fn raycast_walls(ray: &Ray, scene: &Scene) -> Option<WallHit> {
    scene
        .walls
        .iter()
        .filter_map(|w| {
            w.world_bounds.intersect(ray.origin, ray.dir)?;
            let distance = ray_hits_box(ray, &w.transform(), &w.local_box())?;
            Some(WallHit { wall: w.id, distance })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// First placed object the ray enters, tested against each object's scaled,
/// rotated model bounds.
#[must_use]
pub fn raycast_objects(ray: &Ray, objects: &ObjectStore) -> Option<ObjectHit> {
    objects
        .ordered()
        .into_iter()
        .filter_map(|o| {
            let distance = ray_hits_box(ray, &o.transform(), &o.local_box())?;
            Some(ObjectHit { id: o.id, distance })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Where the ray meets the floor plane.
#[must_use]
pub fn floor_point(ray: &Ray) -> Option<DVec3> {
    ray_hits_plane_y(ray, FLOOR_LEVEL)
}
