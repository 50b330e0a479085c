//! Four-view export: capture the room from fixed camera poses and tile the
//! captures into one 2×2 collage.
//!
//! Export reads scene content and never mutates it. The camera is the only
//! state it moves, and the caller's camera is restored (and the interactive
//! view re-presented) before control returns, whether or not a capture failed.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::path::Path;

use glam::DVec3;
use image::{ImageFormat, RgbaImage, imageops};
use tracing::{debug, info};

use crate::camera::{CameraPose, PerspectiveCamera};
use crate::consts::{EXPORT_DISTANCE_FACTOR, EXPORT_MIN_DISTANCE, MAX_FRAME_EDGE, WALL_HEIGHT};
use crate::error::ExportError;
use crate::objects::ObjectStore;
use crate::scene::{Scene, SceneBounds};

/// The canonical export views, in collage order (left-to-right, top-to-bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportView {
    Front,
    Top,
    Left,
    Right,
}

impl ExportView {
    pub const ALL: [Self; 4] = [Self::Front, Self::Top, Self::Left, Self::Right];

    /// Camera pose that frames a room with the given floor bounds.
    #[must_use]
    pub fn pose(self, bounds: &SceneBounds) -> CameraPose {
        let extent = if bounds.is_bounded() {
            bounds.width().max(bounds.depth()).max(WALL_HEIGHT)
        } else {
            WALL_HEIGHT
        };
        let d = (extent * EXPORT_DISTANCE_FACTOR).max(EXPORT_MIN_DISTANCE);
        let mid = DVec3::new(0.0, WALL_HEIGHT / 2.0, 0.0);
        match self {
            Self::Front => CameraPose::looking_at(DVec3::new(0.0, mid.y, d), mid),
            Self::Top => CameraPose { position: DVec3::new(0.0, d, 0.0), target: DVec3::ZERO, up: DVec3::NEG_Z },
            Self::Left => CameraPose::looking_at(DVec3::new(-d, mid.y, 0.0), mid),
            Self::Right => CameraPose::looking_at(DVec3::new(d, mid.y, 0.0), mid),
        }
    }
}

/// What a renderer needs to draw one frame.
pub struct RenderFrame<'a> {
    pub scene: &'a Scene,
    pub objects: &'a ObjectStore,
    pub camera: &'a PerspectiveCamera,
    pub width: u32,
    pub height: u32,
}

/// Draws the scene. Implemented by the host's GPU renderer or by
/// [`crate::raster::SoftwareRenderer`] for headless use.
pub trait SceneRenderer {
    /// Render the frame and read it back as an image.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the frame cannot be produced.
    fn capture(&mut self, frame: &RenderFrame<'_>) -> Result<RgbaImage, ExportError>;

    /// Render the frame to the interactive surface.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the frame cannot be produced.
    fn present(&mut self, frame: &RenderFrame<'_>) -> Result<(), ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportCompositor {
    pub tile_width: u32,
    pub tile_height: u32,
}

impl ExportCompositor {
    #[must_use]
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self { tile_width, tile_height }
    }

    /// Capture all four views and compose them.
    ///
    /// `camera` is left exactly as it was passed in.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when a capture or the composition fails.
    pub fn export(
        &self,
        renderer: &mut dyn SceneRenderer,
        scene: &Scene,
        objects: &ObjectStore,
        camera: &mut PerspectiveCamera,
        viewport: (u32, u32),
    ) -> Result<RgbaImage, ExportError> {
        let original = *camera;
        let captures = self.capture_views(renderer, scene, objects, camera);
        *camera = original;

        let restored = RenderFrame { scene, objects, camera: &*camera, width: viewport.0, height: viewport.1 };
        renderer.present(&restored)?;

        let collage = compose_grid(&captures?)?;
        info!(width = collage.width(), height = collage.height(), "export composed");
        Ok(collage)
    }

    fn capture_views(
        &self,
        renderer: &mut dyn SceneRenderer,
        scene: &Scene,
        objects: &ObjectStore,
        camera: &mut PerspectiveCamera,
    ) -> Result<Vec<RgbaImage>, ExportError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ExportError::EmptyCapture);
        }
        check_frame_size(self.tile_width, self.tile_height)?;
        camera.aspect = f64::from(self.tile_width) / f64::from(self.tile_height);

        let mut captures = Vec::with_capacity(ExportView::ALL.len());
        for view in ExportView::ALL {
            camera.pose = view.pose(&scene.bounds);
            let frame = RenderFrame { scene, objects, camera: &*camera, width: self.tile_width, height: self.tile_height };
            captures.push(renderer.capture(&frame)?);
            debug!(?view, "export view captured");
        }
        Ok(captures)
    }
}

/// Tile four equally sized captures into a 2×2 grid:
/// `[0]` top-left, `[1]` top-right, `[2]` bottom-left, `[3]` bottom-right.
///
/// # Errors
///
/// Returns [`ExportError::TileSizeMismatch`] when sizes differ,
/// [`ExportError::EmptyCapture`] when a tile is missing or zero-sized, and
/// [`ExportError::FrameTooLarge`] when a tile edge exceeds [`MAX_FRAME_EDGE`].
pub fn compose_grid(tiles: &[RgbaImage]) -> Result<RgbaImage, ExportError> {
    let [first, ..] = tiles else {
        return Err(ExportError::EmptyCapture);
    };
    if tiles.len() != 4 {
        return Err(ExportError::EmptyCapture);
    }
    let (w, h) = first.dimensions();
    if w == 0 || h == 0 {
        return Err(ExportError::EmptyCapture);
    }
    check_frame_size(w, h)?;
    for tile in tiles {
        if tile.dimensions() != (w, h) {
            return Err(ExportError::TileSizeMismatch { expected: (w, h), actual: tile.dimensions() });
        }
    }

    let mut collage = RgbaImage::new(w * 2, h * 2);
    for (i, tile) in tiles.iter().enumerate() {
        let col = i64::from(u32::from(i % 2 == 1));
        let row = i64::from(u32::from(i >= 2));
        imageops::overlay(&mut collage, tile, col * i64::from(w), row * i64::from(h));
    }
    Ok(collage)
}

/// Reject frames with an edge above [`MAX_FRAME_EDGE`].
///
/// # Errors
///
/// Returns [`ExportError::FrameTooLarge`].
pub fn check_frame_size(width: u32, height: u32) -> Result<(), ExportError> {
    if width > MAX_FRAME_EDGE || height > MAX_FRAME_EDGE {
        return Err(ExportError::FrameTooLarge { width, height, max: MAX_FRAME_EDGE });
    }
    Ok(())
}

/// Write the collage as a PNG.
///
/// # Errors
///
/// Returns [`ExportError::Image`] when encoding or the write fails.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    image.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "export written");
    Ok(())
}
