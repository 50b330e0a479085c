//! Interaction state machine: paint walls, drag and rotate placed objects.
//!
//! ```text
//!   Idle ──arm_paint──▶ PaintArmed ──wall click──▶ PaintArmed | Idle (per PaintPolicy)
//!    │ ▲                    │ ▲
//!    │ └────disarm_paint────┘ └── miss: stays armed
//!    ├─primary press on object──▶ ObjectSelectedDrag ──release──▶ Idle
//!    └─secondary press on object─▶ ObjectSelectedRotate ─release─▶ Idle
//! ```
//!
//! Selecting an object locks camera navigation and releasing the button that
//! started the gesture always unlocks it, even when the gesture never moved.
//! Releasing any other button leaves the gesture running. A press that arrives while a
//! gesture is active is ignored; the gesture must be released first.
//! Ray-cast misses fail the transition silently.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use tracing::debug;

use crate::camera::{PerspectiveCamera, Point, Viewport};
use crate::color::Color;
use crate::config::PaintPolicy;
use crate::consts::{CLICK_SLOP_PX, ROTATE_SPEED};
use crate::engine::Action;
use crate::hit::{floor_point, raycast_objects, raycast_walls};
use crate::input::{Button, InputGesture, InteractionState};
use crate::objects::{ObjectId, ObjectStore};
use crate::scene::Scene;

/// Everything a pointer handler may read or mutate.
pub struct Targets<'a> {
    pub scene: &'a mut Scene,
    pub objects: &'a mut ObjectStore,
    pub camera: &'a PerspectiveCamera,
    pub viewport: Viewport,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    paint_policy: PaintPolicy,
    rotate_speed: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(PaintPolicy::default(), ROTATE_SPEED)
    }
}

impl InteractionController {
    #[must_use]
    pub fn new(paint_policy: PaintPolicy, rotate_speed: f64) -> Self {
        Self { state: InteractionState::Idle, paint_policy, rotate_speed }
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Whether an object gesture currently holds camera navigation off.
    #[must_use]
    pub fn navigation_locked(&self) -> bool {
        self.state.active_object().is_some()
    }

    // --- Paint mode ---

    /// Choose a paint color. Ignored while an object gesture is active.
    pub fn arm_paint(&mut self, color: Color) -> Vec<Action> {
        match self.state {
            InteractionState::Idle | InteractionState::PaintArmed { .. } => {
                self.state = InteractionState::PaintArmed { color, press: None };
                debug!(%color, "paint armed");
                vec![Action::PaintArmed(color)]
            }
            InteractionState::ObjectSelectedDrag { .. } | InteractionState::ObjectSelectedRotate { .. } => {
                debug!(%color, "paint selection ignored during object gesture");
                Vec::new()
            }
        }
    }

    pub fn disarm_paint(&mut self) -> Vec<Action> {
        if !self.state.is_paint_armed() {
            return Vec::new();
        }
        self.state = InteractionState::Idle;
        vec![Action::PaintDisarmed]
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, t: &mut Targets<'_>) -> Vec<Action> {
        match self.state {
            InteractionState::Idle => self.try_select(pt, button, t),
            InteractionState::PaintArmed { color, .. } => {
                if button == Button::Primary {
                    self.state = InteractionState::PaintArmed { color, press: Some(pt) };
                }
                Vec::new()
            }
            InteractionState::ObjectSelectedDrag { .. } | InteractionState::ObjectSelectedRotate { .. } => {
                debug!(?button, "press ignored while a gesture is active");
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, pt: Point, t: &mut Targets<'_>) -> Vec<Action> {
        match self.state {
            InteractionState::ObjectSelectedDrag { id, .. } => Self::drag_to(id, pt, t),
            InteractionState::ObjectSelectedRotate { id, last_x } => {
                self.state = InteractionState::ObjectSelectedRotate { id, last_x: pt.x };
                self.rotate_by(id, pt.x - last_x, t)
            }
            InteractionState::Idle | InteractionState::PaintArmed { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, t: &mut Targets<'_>) -> Vec<Action> {
        match self.state {
            InteractionState::ObjectSelectedDrag { id, .. } | InteractionState::ObjectSelectedRotate { id, .. } => {
                if InputGesture::from_button(button) != self.state.gesture() {
                    debug!(%id, ?button, "release of another button ignored during gesture");
                    return Vec::new();
                }
                self.state = InteractionState::Idle;
                debug!(%id, "object released");
                vec![Action::ObjectReleased { id }, Action::CameraNavigation(true)]
            }
            InteractionState::PaintArmed { color, press } => {
                self.state = InteractionState::PaintArmed { color, press: None };
                match press {
                    Some(down) if button == Button::Primary && down.distance(pt) <= CLICK_SLOP_PX => {
                        self.paint_at(pt, color, t)
                    }
                    _ => Vec::new(),
                }
            }
            InteractionState::Idle => Vec::new(),
        }
    }

    // --- Lifecycle ---

    /// An object was removed from the scene. Releases it if it was held.
    pub fn on_object_removed(&mut self, id: ObjectId) -> Vec<Action> {
        if self.state.active_object() != Some(id) {
            return Vec::new();
        }
        self.state = InteractionState::Idle;
        vec![Action::ObjectReleased { id }, Action::CameraNavigation(true)]
    }

    /// Drop whatever is in progress and return to idle.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(id) = self.state.active_object() {
            actions.push(Action::ObjectReleased { id });
            actions.push(Action::CameraNavigation(true));
        } else if self.state.is_paint_armed() {
            actions.push(Action::PaintDisarmed);
        }
        self.state = InteractionState::Idle;
        actions
    }

    // --- Internals ---

    fn try_select(&mut self, pt: Point, button: Button, t: &Targets<'_>) -> Vec<Action> {
        let Some(gesture) = InputGesture::from_button(button) else {
            return Vec::new();
        };
        let Some(ray) = t.camera.ray_from_screen(&t.viewport, pt) else {
            return Vec::new();
        };
        let Some(hit) = raycast_objects(&ray, &*t.objects) else {
            return Vec::new();
        };
        self.state = match gesture {
            InputGesture::Drag => InteractionState::ObjectSelectedDrag { id: hit.id, press: pt },
            InputGesture::Rotate => InteractionState::ObjectSelectedRotate { id: hit.id, last_x: pt.x },
        };
        debug!(id = %hit.id, ?gesture, distance = hit.distance, "object selected");
        vec![Action::CameraNavigation(false), Action::ObjectSelected { id: hit.id, gesture }]
    }

    fn drag_to(id: ObjectId, pt: Point, t: &mut Targets<'_>) -> Vec<Action> {
        let Some(ray) = t.camera.ray_from_screen(&t.viewport, pt) else {
            return Vec::new();
        };
        let Some(hit) = floor_point(&ray) else {
            return Vec::new();
        };
        let (x, z) = t.scene.bounds.clamp(hit.x, hit.z);
        let Some(obj) = t.objects.get_mut(&id) else {
            return Vec::new();
        };
        obj.set_floor_position(x, z);
        vec![Action::ObjectMoved { id, x, z }, Action::RenderNeeded]
    }

    fn rotate_by(&self, id: ObjectId, dx: f64, t: &mut Targets<'_>) -> Vec<Action> {
        if dx == 0.0 {
            return Vec::new();
        }
        let Some(obj) = t.objects.get_mut(&id) else {
            return Vec::new();
        };
        obj.rotation_y += dx * self.rotate_speed;
        vec![Action::ObjectRotated { id, rotation_y: obj.rotation_y }, Action::RenderNeeded]
    }

    fn paint_at(&mut self, pt: Point, color: Color, t: &mut Targets<'_>) -> Vec<Action> {
        let hit = t.camera.ray_from_screen(&t.viewport, pt).and_then(|ray| raycast_walls(&ray, &*t.scene));
        let Some(hit) = hit else {
            debug!(%color, "paint click missed every wall; still armed");
            return Vec::new();
        };
        if !t.scene.paint_wall(hit.wall, color) {
            return Vec::new();
        }
        let refreshed = t.scene.refresh_bounds();
        debug!(wall = hit.wall.0, %color, refreshed, "wall painted");

        let mut actions = vec![Action::WallPainted { wall: hit.wall, color }, Action::RenderNeeded];
        if self.paint_policy == PaintPolicy::OneShot {
            self.state = InteractionState::Idle;
            actions.push(Action::PaintDisarmed);
        }
        actions
    }
}
