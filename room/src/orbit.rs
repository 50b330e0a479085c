//! Orbit camera navigation.
//!
//! Dragging on empty space swings the camera around its target on a sphere;
//! the wheel moves it closer or farther within fixed limits. Object gestures
//! switch navigation off for their duration via [`OrbitController::set_enabled`].

#[cfg(test)]
#[path = "orbit_test.rs"]
mod orbit_test;

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::camera::{PerspectiveCamera, Point, Viewport};
use crate::consts::{ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE, ORBIT_POLAR_EPSILON, ORBIT_ROTATE_SPEED};

/// Scale of one wheel pixel in zoom steps.
const ZOOM_PER_PIXEL: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct OrbitController {
    enabled: bool,
    last: Option<Point>,
    pub rotate_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            enabled: true,
            last: None,
            rotate_speed: ORBIT_ROTATE_SPEED,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
        }
    }
}

impl OrbitController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn navigation on or off. Disabling drops any orbit drag in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.last = None;
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn begin(&mut self, pt: Point) {
        if self.enabled {
            self.last = Some(pt);
        }
    }

    /// Swing the camera by the pointer delta. Returns whether the camera moved.
    pub fn drag(&mut self, pt: Point, camera: &mut PerspectiveCamera, viewport: &Viewport) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        if !self.enabled || viewport.height <= 0.0 {
            return false;
        }
        self.last = Some(pt);
        let d_azimuth = -TAU * (pt.x - last.x) / viewport.height * self.rotate_speed;
        let d_polar = -TAU * (pt.y - last.y) / viewport.height * self.rotate_speed;
        self.rotate(camera, d_azimuth, d_polar);
        true
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    /// Rotate the camera about its target by spherical angle deltas.
    pub fn rotate(&self, camera: &mut PerspectiveCamera, d_azimuth: f64, d_polar: f64) {
        let offset = camera.pose.position - camera.pose.target;
        let radius = offset.length();
        if radius <= 0.0 {
            return;
        }
        let azimuth = offset.x.atan2(offset.z) + d_azimuth;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() - d_polar)
            .clamp(ORBIT_POLAR_EPSILON, PI - ORBIT_POLAR_EPSILON);
        camera.pose.position = camera.pose.target + spherical(radius, polar, azimuth);
    }

    /// Dolly toward (negative `dy`) or away from the target, clamped to the distance limits.
    /// Returns whether the camera moved.
    pub fn zoom(&self, camera: &mut PerspectiveCamera, dy: f64) -> bool {
        if !self.enabled || dy == 0.0 {
            return false;
        }
        let offset = camera.pose.position - camera.pose.target;
        let radius = offset.length();
        let Some(dir) = offset.try_normalize() else {
            return false;
        };
        let next = (radius * (1.0 + dy * ZOOM_PER_PIXEL)).clamp(self.min_distance, self.max_distance);
        camera.pose.position = camera.pose.target + dir * next;
        (next - radius).abs() > 1e-9
    }
}

fn spherical(radius: f64, polar: f64, azimuth: f64) -> DVec3 {
    DVec3::new(radius * polar.sin() * azimuth.sin(), radius * polar.cos(), radius * polar.sin() * azimuth.cos())
}
