//! Screen points, the viewport, and the perspective camera.
//!
//! Picking starts here: a screen point in CSS pixels becomes normalized device
//! coordinates, which [`PerspectiveCamera::ray`] unprojects into a world ray.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DMat4, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, WALL_HEIGHT};
use crate::geom::Ray;

/// A point in screen space (CSS pixels, origin top-left) or drawing space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the drawing surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }

    /// Map a screen point to normalized device coordinates (`[-1, 1]`, +Y up).
    ///
    /// Returns `None` for a zero-sized viewport.
    #[must_use]
    pub fn to_ndc(&self, pt: Point) -> Option<DVec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(DVec2::new((pt.x / self.width) * 2.0 - 1.0, -(pt.y / self.height) * 2.0 + 1.0))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0 }
    }
}

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
}

impl CameraPose {
    #[must_use]
    pub fn looking_at(position: DVec3, target: DVec3) -> Self {
        Self { position, target, up: DVec3::Y }
    }

    /// The opening view: above and in front of the room, aimed at mid-wall height.
    #[must_use]
    pub fn initial() -> Self {
        Self::looking_at(DVec3::new(-500.0, 800.0, 1000.0), DVec3::new(0.0, WALL_HEIGHT / 2.0, 0.0))
    }
}

/// A perspective camera with a symmetric frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub pose: CameraPose,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            pose: CameraPose::initial(),
            fov_y_deg: CAMERA_FOV_DEG,
            aspect: 4.0 / 3.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl PerspectiveCamera {
    #[must_use]
    pub fn view(&self) -> DMat4 {
        DMat4::look_at_rh(self.pose.position, self.pose.target, self.pose.up)
    }

    #[must_use]
    pub fn projection(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> DMat4 {
        self.projection() * self.view()
    }

    /// Unproject NDC into a world-space ray from the near plane toward the far plane.
    #[must_use]
    pub fn ray(&self, ndc: DVec2) -> Option<Ray> {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(DVec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(DVec3::new(ndc.x, ndc.y, 1.0));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        Ray::new(near, far - near)
    }

    /// Ray through a screen point.
    #[must_use]
    pub fn ray_from_screen(&self, viewport: &Viewport, pt: Point) -> Option<Ray> {
        self.ray(viewport.to_ndc(pt)?)
    }

    /// Project a world point to screen pixels. `None` when behind the camera.
    #[must_use]
    pub fn world_to_screen(&self, viewport: &Viewport, world: DVec3) -> Option<Point> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Point::new((ndc.x + 1.0) * 0.5 * viewport.width, (1.0 - ndc.y) * 0.5 * viewport.height))
    }
}
