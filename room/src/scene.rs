//! Layout → 3D scene synthesis.
//!
//! [`build`] is a pure function of the [`Layout`]. It centers the walls on the
//! world origin using the midpoint of the layout's bounding rectangle, turns
//! each segment into a box-shaped [`WallMesh`], lays a floor plane over the
//! bounding rectangle, and exports the floor's extent as [`SceneBounds`] for
//! drag clamping.
//!
//! Drawing-space `(x, y)` maps to world `(x, z)`; world `y` is up. Wall meshes
//! live in an arena indexed by [`WallId`], which is the wall's index in the
//! layout it was built from. The whole arena is replaced when the layout
//! changes, so a `WallId` never outlives its scene.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use glam::{DAffine3, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::consts::{FLOOR_LEVEL, WALL_HEIGHT, WALL_THICKNESS};
use crate::geom::Aabb;
use crate::grid::{Layout, WallSegment};

/// Index of a wall mesh in its scene; equal to the segment's index in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub usize);

/// Surface appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub roughness: f64,
    pub metalness: f64,
    pub double_sided: bool,
}

impl Material {
    /// Fresh wall surface: white, double-sided.
    #[must_use]
    pub fn wall() -> Self {
        Self::painted(Color::WHITE)
    }

    /// Wall surface in a chosen paint color.
    #[must_use]
    pub fn painted(color: Color) -> Self {
        Self { color, roughness: 0.2, metalness: 0.1, double_sided: true }
    }

    #[must_use]
    pub fn floor() -> Self {
        Self { color: Color::from_u32(0xF0_F0F0), roughness: 0.5, metalness: 0.1, double_sided: false }
    }
}

/// Renderable box derived from one wall segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallMesh {
    pub id: WallId,
    pub segment: WallSegment,
    /// Center of the box in world space.
    pub position: DVec3,
    /// Box extent along its local X axis, `hypot(dx, dy)` of the segment.
    pub length: f64,
    pub height: f64,
    pub thickness: f64,
    /// Rotation about +Y in radians, `-atan2(dy, dx)`.
    pub rotation_y: f64,
    pub material: Material,
    /// Bumped each time the material is replaced.
    pub material_revision: u32,
    /// World-space box around the wall, the broad phase for wall picking.
    pub world_bounds: Aabb,
    /// Set when `world_bounds` must be recomputed before the next pick.
    pub bounds_dirty: bool,
}

impl WallMesh {
    /// Local-to-world transform (rotation about Y, then translation).
    #[must_use]
    pub fn transform(&self) -> DAffine3 {
        DAffine3::from_rotation_translation(DQuat::from_rotation_y(self.rotation_y), self.position)
    }

    /// Box extents in the wall's own frame.
    #[must_use]
    pub fn local_box(&self) -> Aabb {
        Aabb::centered(DVec3::new(self.length / 2.0, self.height / 2.0, self.thickness / 2.0))
    }

    /// World-space bounds of the wall box, derived from its transform.
    #[must_use]
    pub fn compute_world_bounds(&self) -> Aabb {
        self.local_box().transformed(&self.transform())
    }

    /// Swap in a new surface. The previous material is dropped.
    pub fn replace_material(&mut self, material: Material) {
        self.material = material;
        self.material_revision = self.material_revision.wrapping_add(1);
        self.bounds_dirty = true;
    }
}

/// Horizontal floor plane centered at the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub width: f64,
    pub depth: f64,
    pub material: Material,
}

impl Floor {
    #[must_use]
    pub fn local_box(&self) -> Aabb {
        Aabb::new(
            DVec3::new(-self.width / 2.0, FLOOR_LEVEL, -self.depth / 2.0),
            DVec3::new(self.width / 2.0, FLOOR_LEVEL, self.depth / 2.0),
        )
    }
}

/// World-space floor rectangle used to clamp dragged objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl SceneBounds {
    /// No floor yet: nothing is clamped.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            min_x: f64::NEG_INFINITY,
            max_x: f64::INFINITY,
            min_z: f64::NEG_INFINITY,
            max_z: f64::INFINITY,
        }
    }

    /// Rectangle of the given size centered on the origin.
    #[must_use]
    pub fn centered(width: f64, depth: f64) -> Self {
        Self { min_x: -width / 2.0, max_x: width / 2.0, min_z: -depth / 2.0, max_z: depth / 2.0 }
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.min_x.is_finite() && self.max_x.is_finite() && self.min_z.is_finite() && self.max_z.is_finite()
    }

    /// Clamp `(x, z)` component-wise into the rectangle.
    #[must_use]
    pub fn clamp(&self, x: f64, z: f64) -> (f64, f64) {
        (x.clamp(self.min_x, self.max_x), z.clamp(self.min_z, self.max_z))
    }

    #[must_use]
    pub fn contains(&self, x: f64, z: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Everything synthesized from one layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub walls: Vec<WallMesh>,
    pub floor: Option<Floor>,
    pub bounds: SceneBounds,
    /// Drawing-space center the walls were shifted by.
    pub center: (f64, f64),
}

impl Scene {
    /// A scene with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self { walls: Vec::new(), floor: None, bounds: SceneBounds::unbounded(), center: (0.0, 0.0) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    #[must_use]
    pub fn wall(&self, id: WallId) -> Option<&WallMesh> {
        self.walls.get(id.0)
    }

    pub fn wall_mut(&mut self, id: WallId) -> Option<&mut WallMesh> {
        self.walls.get_mut(id.0)
    }

    /// Repaint one wall. Returns `false` if `id` is not in this scene.
    pub fn paint_wall(&mut self, id: WallId, color: Color) -> bool {
        let Some(wall) = self.wall_mut(id) else {
            return false;
        };
        wall.replace_material(Material::painted(color));
        true
    }

    /// Recompute `world_bounds` for walls flagged dirty by material swaps.
    /// Returns how many walls were refreshed.
    pub fn refresh_bounds(&mut self) -> usize {
        let mut refreshed = 0;
        for wall in self.walls.iter_mut().filter(|w| w.bounds_dirty) {
            wall.world_bounds = wall.compute_world_bounds();
            wall.bounds_dirty = false;
            refreshed += 1;
        }
        refreshed
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

/// Synthesize the scene for `layout`.
///
/// An empty layout yields [`Scene::empty`]. Zero-length segments are kept and
/// produce zero-length walls.
#[must_use]
pub fn build(layout: &Layout) -> Scene {
    let walls = layout.walls();
    if walls.is_empty() {
        return Scene::empty();
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for w in walls {
        for x in [w.x1, w.x2] {
            min_x = min_x.min(f64::from(x));
            max_x = max_x.max(f64::from(x));
        }
        for y in [w.y1, w.y2] {
            min_y = min_y.min(f64::from(y));
            max_y = max_y.max(f64::from(y));
        }
    }

    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;

    let meshes: Vec<WallMesh> = walls
        .iter()
        .enumerate()
        .map(|(i, seg)| wall_mesh(WallId(i), *seg, center_x, center_y))
        .collect();

    let floor_width = max_x - min_x;
    let floor_depth = max_y - min_y;
    let bounds = SceneBounds::centered(floor_width, floor_depth);

    debug!(walls = meshes.len(), floor_width, floor_depth, center_x, center_y, "scene built");

    Scene {
        walls: meshes,
        floor: Some(Floor { width: floor_width, depth: floor_depth, material: Material::floor() }),
        bounds,
        center: (center_x, center_y),
    }
}

fn wall_mesh(id: WallId, seg: WallSegment, center_x: f64, center_y: f64) -> WallMesh {
    let (x1, y1) = (f64::from(seg.x1), f64::from(seg.y1));
    let (x2, y2) = (f64::from(seg.x2), f64::from(seg.y2));
    let mut wall = WallMesh {
        id,
        segment: seg,
        position: DVec3::new((x1 + x2) / 2.0 - center_x, WALL_HEIGHT / 2.0, (y1 + y2) / 2.0 - center_y),
        length: seg.length(),
        height: WALL_HEIGHT,
        thickness: WALL_THICKNESS,
        rotation_y: -(y2 - y1).atan2(x2 - x1),
        material: Material::wall(),
        material_revision: 0,
        world_bounds: Aabb::empty(),
        bounds_dirty: false,
    };
    wall.world_bounds = wall.compute_world_bounds();
    wall
}
