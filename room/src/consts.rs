//! Shared numeric constants for the room engine.

// ── Grid ────────────────────────────────────────────────────────

/// Grid pitch in drawing-space units. Every wall endpoint is a multiple of this.
pub const GRID_SIZE: i32 = 20;

/// Screen-space distance within which a delete click hits a wall, in pixels.
pub const DELETE_HIT_TOLERANCE_PX: f64 = 8.0;

/// Display units per grid cell when the unit is feet.
pub const FEET_PER_CELL: f64 = 1.0;

/// Display units per grid cell when the unit is meters.
pub const METERS_PER_CELL: f64 = 0.3048;

// ── Walls / floor ───────────────────────────────────────────────

/// Wall height in world units.
pub const WALL_HEIGHT: f64 = 250.0;

/// Wall thickness in world units.
pub const WALL_THICKNESS: f64 = 10.0;

/// World-space y of the floor plane.
pub const FLOOR_LEVEL: f64 = 0.0;

// ── Interaction ─────────────────────────────────────────────────

/// Radians of rotation per pixel of horizontal pointer travel.
pub const ROTATE_SPEED: f64 = 0.01;

/// Maximum pointer travel between press and release for a paint click, in pixels.
pub const CLICK_SLOP_PX: f64 = 4.0;

/// Height placed models are normalized to, in world units.
pub const MODEL_TARGET_HEIGHT: f64 = 100.0;

// ── Camera ──────────────────────────────────────────────────────

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f64 = 45.0;

pub const CAMERA_NEAR: f64 = 1.0;

pub const CAMERA_FAR: f64 = 10_000.0;

/// Orbit zoom limits (distance from the target).
pub const ORBIT_MIN_DISTANCE: f64 = 500.0;
pub const ORBIT_MAX_DISTANCE: f64 = 3000.0;

/// Orbit rotate speed multiplier.
pub const ORBIT_ROTATE_SPEED: f64 = 0.5;

/// Keeps the orbit polar angle off the poles so the view basis stays defined.
pub const ORBIT_POLAR_EPSILON: f64 = 1e-4;

// ── Export ──────────────────────────────────────────────────────

/// Default per-view capture size in pixels.
pub const EXPORT_TILE_WIDTH: u32 = 640;
pub const EXPORT_TILE_HEIGHT: u32 = 480;

/// Largest frame edge, in pixels, that captures and renders accept.
pub const MAX_FRAME_EDGE: u32 = 8192;

/// Export camera distance as a multiple of the room's largest extent.
pub const EXPORT_DISTANCE_FACTOR: f64 = 1.6;

/// Lower bound on export camera distance so tiny rooms still frame the walls.
pub const EXPORT_MIN_DISTANCE: f64 = 600.0;
