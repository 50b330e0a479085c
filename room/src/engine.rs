use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info};

use crate::assets::{AssetLoader, ModelRef, ModelRepository};
use crate::camera::{CameraPose, PerspectiveCamera, Point, Viewport};
use crate::color::{Color, swatch};
use crate::config::EngineConfig;
use crate::error::ExportError;
use crate::export::{ExportCompositor, SceneRenderer};
use crate::grid::Layout;
use crate::input::{Button, InputGesture, InteractionState, WheelDelta};
use crate::interaction::{InteractionController, Targets};
use crate::objects::{ObjectId, ObjectStore};
use crate::orbit::OrbitController;
use crate::placement::{LoadTicket, PlacementEvent, PlacementManager};
use crate::scene::{self, Scene, WallId};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SceneRebuilt { walls: usize },
    /// Orbit navigation was switched on or off.
    CameraNavigation(bool),
    PaintArmed(Color),
    PaintDisarmed,
    WallPainted { wall: WallId, color: Color },
    ObjectSelected { id: ObjectId, gesture: InputGesture },
    ObjectMoved { id: ObjectId, x: f64, z: f64 },
    ObjectRotated { id: ObjectId, rotation_y: f64 },
    ObjectReleased { id: ObjectId },
    ObjectPlaced { id: ObjectId, reference: ModelRef },
    ObjectRemoved { id: ObjectId },
    /// A model load failed. The message is meant for the user.
    LoadFailed { ticket: LoadTicket, reference: ModelRef, message: String, retryable: bool },
}

/// Default interactive surface size in pixels.
const DEFAULT_SURFACE: (u32, u32) = (800, 600);

/// The room: scene, camera, navigation, interaction and placed objects.
pub struct RoomEngine {
    config: EngineConfig,
    layout: Layout,
    scene: Scene,
    camera: PerspectiveCamera,
    surface: (u32, u32),
    orbit: OrbitController,
    interaction: InteractionController,
    placement: PlacementManager,
}

impl RoomEngine {
    #[must_use]
    pub fn new(config: EngineConfig, repository: Arc<dyn ModelRepository>, loader: Arc<dyn AssetLoader>) -> Self {
        let mut camera = PerspectiveCamera::default();
        camera.aspect = f64::from(DEFAULT_SURFACE.0) / f64::from(DEFAULT_SURFACE.1);
        Self {
            config,
            layout: Layout::new(),
            scene: Scene::empty(),
            camera,
            surface: DEFAULT_SURFACE,
            orbit: OrbitController::new(),
            interaction: InteractionController::new(config.paint_policy, config.rotate_speed),
            placement: PlacementManager::new(repository, loader, config.load_policy, config.model_target_height),
        }
    }

    // --- Scene lifecycle ---

    /// Replace the room with one built from `layout`.
    ///
    /// Any gesture is released, pending loads are cancelled, placed objects
    /// are dropped and the camera returns to its initial pose.
    pub fn load_layout(&mut self, layout: Layout) -> Vec<Action> {
        let mut actions = self.teardown();
        self.scene = scene::build(&layout);
        self.layout = layout;
        self.camera.pose = CameraPose::initial();
        info!(walls = self.scene.walls.len(), "room loaded");
        actions.push(Action::SceneRebuilt { walls: self.scene.walls.len() });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Release every gesture, abort loads and drop placed objects.
    pub fn teardown(&mut self) -> Vec<Action> {
        let mut actions = self.interaction.reset();
        for id in self.placement.objects().ids() {
            actions.push(Action::ObjectRemoved { id });
        }
        self.placement.teardown();
        self.orbit.end();
        self.apply(&actions);
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectStore {
        self.placement.objects()
    }

    #[must_use]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(f64::from(self.surface.0), f64::from(self.surface.1))
    }

    #[must_use]
    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    #[must_use]
    pub fn navigation_enabled(&self) -> bool {
        self.orbit.is_enabled()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.placement.is_loading()
    }

    // --- View ---

    pub fn set_camera_pose(&mut self, pose: CameraPose) -> Vec<Action> {
        self.camera.pose = pose;
        vec![Action::RenderNeeded]
    }

    /// Resize the interactive surface. Zero dimensions are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Vec<Action> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        self.surface = (width, height);
        self.camera.aspect = f64::from(width) / f64::from(height);
        vec![Action::RenderNeeded]
    }

    // --- Paint ---

    pub fn arm_paint(&mut self, color: Color) -> Vec<Action> {
        self.interaction.arm_paint(color)
    }

    /// Arm paint with one of the built-in swatches. Unknown ids are ignored.
    pub fn arm_swatch(&mut self, id: u32) -> Vec<Action> {
        match swatch(id) {
            Some(s) => self.interaction.arm_paint(s.color),
            None => Vec::new(),
        }
    }

    pub fn disarm_paint(&mut self) -> Vec<Action> {
        self.interaction.disarm_paint()
    }

    // --- Objects ---

    /// Start loading a model. Completion is reported by [`RoomEngine::tick`].
    /// Must be called from within a Tokio runtime.
    pub fn select_model(&mut self, reference: ModelRef) -> LoadTicket {
        self.placement.request(reference)
    }

    pub fn cancel_load(&mut self, ticket: LoadTicket) -> bool {
        self.placement.cancel(ticket)
    }

    /// Apply finished loads. Call once per frame.
    pub fn tick(&mut self) -> Vec<Action> {
        let events = self.placement.poll();
        self.apply_placements(events)
    }

    /// Wait for every pending load and apply the results.
    pub async fn settle_loads(&mut self) -> Vec<Action> {
        let events = self.placement.settle().await;
        self.apply_placements(events)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Vec<Action> {
        if self.placement.remove(&id).is_none() {
            return Vec::new();
        }
        let mut actions = self.interaction.on_object_removed(id);
        actions.push(Action::ObjectRemoved { id });
        actions.push(Action::RenderNeeded);
        self.apply(&actions);
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        let viewport = self.viewport();
        let mut targets = Targets {
            scene: &mut self.scene,
            objects: self.placement.objects_mut(),
            camera: &self.camera,
            viewport,
        };
        let actions = self.interaction.on_pointer_down(pt, button, &mut targets);
        self.apply(&actions);
        if button == Button::Primary && !self.interaction.navigation_locked() {
            self.orbit.begin(pt);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let viewport = self.viewport();
        let mut targets = Targets {
            scene: &mut self.scene,
            objects: self.placement.objects_mut(),
            camera: &self.camera,
            viewport,
        };
        let mut actions = self.interaction.on_pointer_move(pt, &mut targets);
        if self.orbit.drag(pt, &mut self.camera, &viewport) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button) -> Vec<Action> {
        self.orbit.end();
        let viewport = self.viewport();
        let mut targets = Targets {
            scene: &mut self.scene,
            objects: self.placement.objects_mut(),
            camera: &self.camera,
            viewport,
        };
        let actions = self.interaction.on_pointer_up(pt, button, &mut targets);
        self.apply(&actions);
        actions
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if self.orbit.zoom(&mut self.camera, delta.dy) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Export ---

    /// Capture the four canonical views and compose the 2×2 collage.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when a capture or the composition fails. The
    /// camera is restored either way.
    pub fn export(&mut self, renderer: &mut dyn SceneRenderer) -> Result<RgbaImage, ExportError> {
        let compositor = ExportCompositor::new(self.config.export_tile_width, self.config.export_tile_height);
        compositor.export(renderer, &self.scene, self.placement.objects(), &mut self.camera, self.surface)
    }

    // --- Internals ---

    fn apply(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::CameraNavigation(enabled) = action {
                self.orbit.set_enabled(*enabled);
            }
        }
    }

    fn apply_placements(&mut self, events: Vec<PlacementEvent>) -> Vec<Action> {
        let mut actions = Vec::new();
        for event in events {
            match event {
                PlacementEvent::Placed { id, reference, replaced, .. } => {
                    for old in replaced {
                        actions.extend(self.interaction.on_object_removed(old));
                        actions.push(Action::ObjectRemoved { id: old });
                    }
                    actions.push(Action::ObjectPlaced { id, reference });
                }
                PlacementEvent::Failed { ticket, reference, error } => {
                    debug!(ticket = ticket.0, code = error.error_code(), "surfacing load failure");
                    actions.push(Action::LoadFailed {
                        ticket,
                        reference,
                        message: error.to_string(),
                        retryable: error.retryable(),
                    });
                }
            }
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        self.apply(&actions);
        actions
    }
}
