//! Placed objects and the in-memory store that owns them.

#[cfg(test)]
#[path = "objects_test.rs"]
mod objects_test;

use std::collections::HashMap;
use std::sync::Arc;

use glam::{DAffine3, DQuat, DVec3};
use serde::Serialize;
use uuid::Uuid;

use crate::assets::{ModelAsset, ModelRef};
use crate::consts::FLOOR_LEVEL;
use crate::geom::Aabb;

/// Unique identifier for a placed object.
pub type ObjectId = Uuid;

/// A model instance standing on the floor.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedObject {
    pub id: ObjectId,
    /// The reference the user selected.
    pub reference: ModelRef,
    /// Parsed asset shared by every instance of the same load.
    #[serde(skip)]
    pub model: Arc<ModelAsset>,
    /// Floor position; `y` is always [`FLOOR_LEVEL`].
    pub position: DVec3,
    /// Rotation about +Y in radians.
    pub rotation_y: f64,
    /// Uniform scale applied to the asset.
    pub scale: f64,
    /// Placement order, used for stable iteration.
    pub seq: u64,
}

impl PlacedObject {
    #[must_use]
    pub fn new(reference: ModelRef, model: Arc<ModelAsset>, scale: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference,
            model,
            position: DVec3::new(0.0, FLOOR_LEVEL, 0.0),
            rotation_y: 0.0,
            scale,
            seq: 0,
        }
    }

    /// Asset-space to world-space transform (scale, then rotate about Y, then translate).
    #[must_use]
    pub fn transform(&self) -> DAffine3 {
        DAffine3::from_scale_rotation_translation(
            DVec3::splat(self.scale),
            DQuat::from_rotation_y(self.rotation_y),
            self.position,
        )
    }

    /// The asset's bounds in its own frame.
    #[must_use]
    pub fn local_box(&self) -> Aabb {
        self.model.bounds
    }

    /// World-space axis-aligned bounds.
    #[must_use]
    pub fn world_box(&self) -> Aabb {
        self.model.bounds.transformed(&self.transform())
    }

    /// Move to `(x, z)` on the floor.
    pub fn set_floor_position(&mut self, x: f64, z: f64) {
        self.position = DVec3::new(x, FLOOR_LEVEL, z);
    }
}

/// Store of placed objects keyed by id.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectId, PlacedObject>,
    next_seq: u64,
}

impl ObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object. Its sequence number is assigned here.
    pub fn insert(&mut self, mut obj: PlacedObject) -> ObjectId {
        obj.seq = self.next_seq;
        self.next_seq += 1;
        let id = obj.id;
        self.objects.insert(id, obj);
        id
    }

    pub fn remove(&mut self, id: &ObjectId) -> Option<PlacedObject> {
        self.objects.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&PlacedObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut PlacedObject> {
        self.objects.get_mut(id)
    }

    /// All objects in placement order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&PlacedObject> {
        let mut objs: Vec<&PlacedObject> = self.objects.values().collect();
        objs.sort_by_key(|o| o.seq);
        objs
    }

    /// Ids of every object, in placement order.
    #[must_use]
    pub fn ids(&self) -> Vec<ObjectId> {
        self.ordered().into_iter().map(|o| o.id).collect()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
