//! Rays, boxes and the intersection tests behind picking.
//!
//! World space is right-handed with +Y up. All picking reduces to two tests:
//! a ray against an axis-aligned box expressed in some local frame, and a ray
//! against the horizontal plane `y = h`.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use glam::{DAffine3, DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Directions shorter than this are treated as zero.
const RAY_EPSILON: f64 = 1e-12;

/// A half-line `origin + t * dir`, `t >= 0`. `dir` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    /// Build a ray, normalizing `dir`. Returns `None` for a zero direction.
    #[must_use]
    pub fn new(origin: DVec3, dir: DVec3) -> Option<Self> {
        let dir = dir.try_normalize()?;
        Some(Self { origin, dir })
    }

    #[must_use]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box centered at the origin with the given half extents.
    #[must_use]
    pub fn centered(half: DVec3) -> Self {
        Self { min: -half, max: half }
    }

    /// The empty box: grows to the first point added.
    #[must_use]
    pub fn empty() -> Self {
        Self { min: DVec3::splat(f64::INFINITY), max: DVec3::splat(f64::NEG_INFINITY) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn grow(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[must_use]
    pub fn size(&self) -> DVec3 {
        if self.is_empty() { DVec3::ZERO } else { self.max - self.min }
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, in no particular order.
    #[must_use]
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform.
    #[must_use]
    pub fn transformed(&self, transform: &DAffine3) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = Self::empty();
        for corner in self.corners() {
            out.grow(transform.transform_point3(corner));
        }
        out
    }

    /// Slab test. Returns the entry distance along the ray (0 when the origin is inside).
    ///
    /// `dir` need not be normalized; the returned `t` is in units of `dir`.
    #[must_use]
    pub fn intersect(&self, origin: DVec3, dir: DVec3) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let (o, d, lo, hi) = (origin[axis], dir[axis], self.min[axis], self.max[axis]);
            if d.abs() < RAY_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Intersect a world-space ray with `local` positioned by `transform`.
///
/// The ray is carried into the box's frame; since the mapping is affine the
/// hit parameter is the same in both frames, so the result is a world distance.
#[must_use]
pub fn ray_hits_box(ray: &Ray, transform: &DAffine3, local: &Aabb) -> Option<f64> {
    let inverse = transform.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let origin = inverse.transform_point3(ray.origin);
    let dir = inverse.transform_vector3(ray.dir);
    local.intersect(origin, dir)
}

/// Intersect a ray with the horizontal plane `y = height`.
///
/// Returns `None` when the ray is parallel to the plane or points away from it.
#[must_use]
pub fn ray_hits_plane_y(ray: &Ray, height: f64) -> Option<DVec3> {
    if ray.dir.y.abs() < RAY_EPSILON {
        return None;
    }
    let t = (height - ray.origin.y) / ray.dir.y;
    if t < 0.0 {
        return None;
    }
    let mut p = ray.at(t);
    p.y = height;
    Some(p)
}

/// Distance from `p` to the segment `a`–`b`. Degenerate segments measure to `a`.
#[must_use]
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < RAY_EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
