//! Headless software renderer.
//!
//! A z-buffered flat-shaded triangle rasterizer. Walls, placed objects and
//! the floor are drawn as boxes with one ambient and two directional lights.
//! It produces export captures without a GPU. Triangles that cross the near
//! plane are dropped rather than clipped.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use glam::{DAffine3, DMat4, DVec3};
use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::error::ExportError;
use crate::export::{RenderFrame, SceneRenderer, check_frame_size};
use crate::geom::Aabb;

const BACKGROUND: Color = Color::from_u32(0xF5_F5F5);
const OBJECT_COLOR: Color = Color::from_u32(0x8B_6F4E);
const AMBIENT: f64 = 0.6;

/// Directional lights as (direction toward the light, intensity).
const LIGHTS: [([f64; 3], f64); 2] = [([500.0, 1000.0, 500.0], 0.8), ([-500.0, 1000.0, -500.0], 0.4)];

/// Clip-space `w` below which a vertex counts as behind the camera.
const MIN_W: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [DVec3; 3],
    color: Color,
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f64,
    y: f64,
    depth: f64,
}

#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    last_frame: Option<RgbaImage>,
}

impl SoftwareRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent frame passed to [`SceneRenderer::present`].
    #[must_use]
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last_frame.as_ref()
    }

    /// Draw a frame into a fresh image.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyCapture`] for a zero-sized frame and
    /// [`ExportError::FrameTooLarge`] for one past the size limit.
    pub fn render(&self, frame: &RenderFrame<'_>) -> Result<RgbaImage, ExportError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ExportError::EmptyCapture);
        }
        check_frame_size(frame.width, frame.height)?;
        let mut target = Target::new(frame.width, frame.height);
        let vp = frame.camera.view_projection();
        for tri in scene_triangles(frame) {
            target.draw(&vp, &tri);
        }
        Ok(target.image)
    }
}

impl SceneRenderer for SoftwareRenderer {
    fn capture(&mut self, frame: &RenderFrame<'_>) -> Result<RgbaImage, ExportError> {
        self.render(frame)
    }

    fn present(&mut self, frame: &RenderFrame<'_>) -> Result<(), ExportError> {
        self.last_frame = Some(self.render(frame)?);
        Ok(())
    }
}

fn scene_triangles(frame: &RenderFrame<'_>) -> Vec<Triangle> {
    let mut out = Vec::new();
    if let Some(floor) = &frame.scene.floor {
        let b = floor.local_box();
        let y = b.min.y;
        let corners = [
            DVec3::new(b.min.x, y, b.min.z),
            DVec3::new(b.max.x, y, b.min.z),
            DVec3::new(b.max.x, y, b.max.z),
            DVec3::new(b.min.x, y, b.max.z),
        ];
        push_quad(&mut out, corners, DVec3::Y, floor.material.color);
    }
    for wall in &frame.scene.walls {
        push_box(&mut out, &wall.transform(), &wall.local_box(), wall.material.color);
    }
    for obj in frame.objects.ordered() {
        push_box(&mut out, &obj.transform(), &obj.local_box(), OBJECT_COLOR);
    }
    out
}

fn push_box(out: &mut Vec<Triangle>, transform: &DAffine3, local: &Aabb, color: Color) {
    if local.is_empty() {
        return;
    }
    let (a, b) = (local.min, local.max);
    let faces = [
        ([DVec3::new(b.x, a.y, a.z), DVec3::new(b.x, b.y, a.z), DVec3::new(b.x, b.y, b.z), DVec3::new(b.x, a.y, b.z)], DVec3::X),
        ([DVec3::new(a.x, a.y, a.z), DVec3::new(a.x, a.y, b.z), DVec3::new(a.x, b.y, b.z), DVec3::new(a.x, b.y, a.z)], DVec3::NEG_X),
        ([DVec3::new(a.x, b.y, a.z), DVec3::new(a.x, b.y, b.z), DVec3::new(b.x, b.y, b.z), DVec3::new(b.x, b.y, a.z)], DVec3::Y),
        ([DVec3::new(a.x, a.y, a.z), DVec3::new(b.x, a.y, a.z), DVec3::new(b.x, a.y, b.z), DVec3::new(a.x, a.y, b.z)], DVec3::NEG_Y),
        ([DVec3::new(a.x, a.y, b.z), DVec3::new(b.x, a.y, b.z), DVec3::new(b.x, b.y, b.z), DVec3::new(a.x, b.y, b.z)], DVec3::Z),
        ([DVec3::new(a.x, a.y, a.z), DVec3::new(a.x, b.y, a.z), DVec3::new(b.x, b.y, a.z), DVec3::new(b.x, a.y, a.z)], DVec3::NEG_Z),
    ];
    for (quad, normal) in faces {
        let world = quad.map(|p| transform.transform_point3(p));
        let n = transform.transform_vector3(normal).normalize_or_zero();
        push_quad(out, world, n, color);
    }
}

fn push_quad(out: &mut Vec<Triangle>, q: [DVec3; 4], normal: DVec3, base: Color) {
    let color = shade(base, normal);
    out.push(Triangle { v: [q[0], q[1], q[2]], color });
    out.push(Triangle { v: [q[0], q[2], q[3]], color });
}

/// Flat Lambert shading, lit from both sides.
fn shade(base: Color, normal: DVec3) -> Color {
    let mut intensity = AMBIENT;
    for (dir, strength) in LIGHTS {
        let l = DVec3::from_array(dir).normalize();
        intensity += strength * normal.dot(l).abs();
    }
    let intensity = intensity.min(1.0);
    let [r, g, b] = base.to_unit();
    Color::rgb(channel(r * intensity), channel(g * intensity), channel(b * intensity))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

struct Target {
    image: RgbaImage,
    depth: Vec<f64>,
    width: u32,
    height: u32,
}

impl Target {
    fn new(width: u32, height: u32) -> Self {
        let bg = Rgba([BACKGROUND.r, BACKGROUND.g, BACKGROUND.b, 255]);
        let len = width as usize * height as usize;
        Self { image: RgbaImage::from_pixel(width, height, bg), depth: vec![f64::INFINITY; len], width, height }
    }

    fn project(&self, vp: &DMat4, p: DVec3) -> Option<ScreenVertex> {
        let clip = *vp * p.extend(1.0);
        if clip.w <= MIN_W {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * f64::from(self.width),
            y: (1.0 - ndc.y) * 0.5 * f64::from(self.height),
            depth: ndc.z,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw(&mut self, vp: &DMat4, tri: &Triangle) {
        let (Some(a), Some(b), Some(c)) =
            (self.project(vp, tri.v[0]), self.project(vp, tri.v[1]), self.project(vp, tri.v[2]))
        else {
            return;
        };
        let area = edge(a, b, c.x, c.y);
        if area.abs() < f64::EPSILON {
            return;
        }

        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let min_x = a.x.min(b.x).min(c.x).floor().clamp(0.0, w) as u32;
        let max_x = a.x.max(b.x).max(c.x).ceil().clamp(0.0, w) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().clamp(0.0, h) as u32;
        let max_y = a.y.max(b.y).max(c.y).ceil().clamp(0.0, h) as u32;
        let px = Rgba([tri.color.r, tri.color.g, tri.color.b, 255]);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let (sx, sy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                let w0 = edge(b, c, sx, sy) / area;
                let w1 = edge(c, a, sx, sy) / area;
                let w2 = edge(a, b, sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                if !(-1.0..=1.0).contains(&depth) {
                    continue;
                }
                let i = y as usize * self.width as usize + x as usize;
                if depth < self.depth[i] {
                    self.depth[i] = depth;
                    self.image.put_pixel(x, y, px);
                }
            }
        }
    }
}

/// Twice the signed area of (a, b, p).
fn edge(a: ScreenVertex, b: ScreenVertex, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}
