//! 2D wall capture on a snapping grid.
//!
//! [`GridCanvas`] turns pointer gestures into an ordered [`Layout`] of
//! [`WallSegment`]s. Draw-tool gestures start a wall on pointer-down, stretch
//! its second endpoint on move, and commit it on pointer-up unless it has zero
//! length. Delete-tool clicks remove the wall nearest the pointer. Every
//! endpoint is snapped to the grid pitch, which scene synthesis relies on for
//! clean joins. Nothing here touches the 3D scene.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Point;
use crate::consts::{DELETE_HIT_TOLERANCE_PX, FEET_PER_CELL, GRID_SIZE, METERS_PER_CELL};
use crate::error::LayoutError;
use crate::geom::point_segment_distance;

/// One wall in drawing-space grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl WallSegment {
    #[must_use]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// A zero-length segment at `(x, y)`, the state of a wall right after pointer-down.
    #[must_use]
    pub fn point(x: i32, y: i32) -> Self {
        Self { x1: x, y1: y, x2: x, y2: y }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }

    #[must_use]
    pub fn dx(&self) -> f64 {
        f64::from(self.x2) - f64::from(self.x1)
    }

    #[must_use]
    pub fn dy(&self) -> f64 {
        f64::from(self.y2) - f64::from(self.y1)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.dx().hypot(self.dy())
    }

    /// Endpoints as floating-point vectors.
    #[must_use]
    pub fn endpoints(&self) -> (DVec2, DVec2) {
        (
            DVec2::new(f64::from(self.x1), f64::from(self.y1)),
            DVec2::new(f64::from(self.x2), f64::from(self.y2)),
        )
    }
}

/// Ordered walls; insertion order is drawing order.
///
/// Serializes as a plain JSON array of `{x1, y1, x2, y2}` objects. Coordinates
/// are integers, so a save/load cycle is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    walls: Vec<WallSegment>,
}

impl Layout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_walls(walls: Vec<WallSegment>) -> Self {
        Self { walls }
    }

    /// Decode a layout from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] when the input is not an array of segments.
    pub fn from_json(raw: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode the layout as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn push(&mut self, wall: WallSegment) {
        self.walls.push(wall);
    }

    /// Remove the wall at `index`, returning it if present.
    pub fn remove(&mut self, index: usize) -> Option<WallSegment> {
        if index < self.walls.len() { Some(self.walls.remove(index)) } else { None }
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Copy of this layout with zero-length walls dropped.
    #[must_use]
    pub fn without_degenerate(&self) -> Self {
        Self { walls: self.walls.iter().copied().filter(|w| !w.is_degenerate()).collect() }
    }
}

/// Snap a drawing-space coordinate to the nearest grid line.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn snap(v: f64) -> i32 {
    let limit = f64::from(i32::MAX / GRID_SIZE);
    let cells = (v / f64::from(GRID_SIZE)).round().clamp(-limit, limit);
    (cells as i32) * GRID_SIZE
}

/// Which 2D tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridTool {
    /// Drag out new walls.
    #[default]
    Draw,
    /// Click a wall to remove it.
    Delete,
}

/// Display unit for wall length labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    /// Display units per grid cell.
    #[must_use]
    pub fn per_cell(self) -> f64 {
        match self {
            Self::Feet => FEET_PER_CELL,
            Self::Meters => METERS_PER_CELL,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Feet => "feet",
            Self::Meters => "meters",
        }
    }
}

/// Changes the grid reports back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A new wall preview started at the snapped pointer.
    WallStarted(WallSegment),
    /// The in-progress wall's second endpoint moved.
    WallStretched(WallSegment),
    /// The wall was appended to the layout at `index`.
    WallCommitted { index: usize, wall: WallSegment },
    /// The gesture ended on a zero-length wall, which was dropped.
    WallDiscarded,
    /// The wall at `index` was removed.
    WallDeleted { index: usize, wall: WallSegment },
    /// The whole layout was cleared.
    Cleared,
}

/// Pointer-driven wall editor.
#[derive(Debug, Clone, Default)]
pub struct GridCanvas {
    layout: Layout,
    tool: GridTool,
    unit: LengthUnit,
    drawing: Option<WallSegment>,
}

impl GridCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing an existing layout.
    #[must_use]
    pub fn with_layout(layout: Layout) -> Self {
        Self { layout, ..Self::default() }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Hand the committed walls to scene synthesis. The grid keeps its own copy.
    #[must_use]
    pub fn snapshot(&self) -> Layout {
        self.layout.clone()
    }

    #[must_use]
    pub fn tool(&self) -> GridTool {
        self.tool
    }

    /// Switch tools. An in-progress wall is abandoned.
    pub fn set_tool(&mut self, tool: GridTool) {
        if self.drawing.take().is_some() {
            debug!(?tool, "tool switched mid-draw; in-progress wall dropped");
        }
        self.tool = tool;
    }

    #[must_use]
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: LengthUnit) {
        self.unit = unit;
    }

    /// The wall currently being dragged out, if any.
    #[must_use]
    pub fn pending(&self) -> Option<WallSegment> {
        self.drawing
    }

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<GridEvent> {
        match self.tool {
            GridTool::Draw => {
                let wall = WallSegment::point(snap(pt.x), snap(pt.y));
                self.drawing = Some(wall);
                vec![GridEvent::WallStarted(wall)]
            }
            GridTool::Delete => self.delete_at(pt).into_iter().collect(),
        }
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<GridEvent> {
        let Some(wall) = self.drawing.as_mut() else {
            return Vec::new();
        };
        let (x2, y2) = (snap(pt.x), snap(pt.y));
        if wall.x2 == x2 && wall.y2 == y2 {
            return Vec::new();
        }
        wall.x2 = x2;
        wall.y2 = y2;
        vec![GridEvent::WallStretched(*wall)]
    }

    pub fn on_pointer_up(&mut self, _pt: Point) -> Vec<GridEvent> {
        let Some(wall) = self.drawing.take() else {
            return Vec::new();
        };
        if wall.is_degenerate() {
            return vec![GridEvent::WallDiscarded];
        }
        self.layout.push(wall);
        let index = self.layout.len() - 1;
        debug!(index, ?wall, "wall committed");
        vec![GridEvent::WallCommitted { index, wall }]
    }

    /// Remove every wall.
    pub fn clear(&mut self) -> Vec<GridEvent> {
        self.drawing = None;
        self.layout.clear();
        vec![GridEvent::Cleared]
    }

    /// Index of the committed wall nearest `pt`, if one lies within the hit tolerance.
    #[must_use]
    pub fn wall_at(&self, pt: Point) -> Option<usize> {
        let p = DVec2::new(pt.x, pt.y);
        self.layout
            .walls()
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let (a, b) = w.endpoints();
                (i, point_segment_distance(p, a, b))
            })
            .filter(|(_, d)| *d <= DELETE_HIT_TOLERANCE_PX)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn delete_at(&mut self, pt: Point) -> Option<GridEvent> {
        let index = self.wall_at(pt)?;
        let wall = self.layout.remove(index)?;
        debug!(index, ?wall, "wall deleted");
        Some(GridEvent::WallDeleted { index, wall })
    }

    /// Length label for a wall in the active unit, e.g. `"5.0 feet"`.
    #[must_use]
    pub fn length_label(&self, wall: &WallSegment) -> String {
        let cells = wall.length() / f64::from(GRID_SIZE);
        format!("{:.1} {}", cells * self.unit.per_cell(), self.unit.label())
    }
}
