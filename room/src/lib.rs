//! Floorplan-to-room engine.
//!
//! Turns a grid-snapped 2D wall sketch into a centered 3D scene and drives
//! everything the user does inside it: painting walls, placing furniture
//! models, dragging them across the floor, rotating them, and exporting a
//! four-view collage. Rendering to a real GPU surface belongs to the host;
//! the engine owns scene state and emits [`engine::Action`]s describing what
//! changed.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`grid`] | 2D wall capture on a snapping grid, the [`grid::Layout`] model |
//! | [`scene`] | Layout → scene synthesis (walls, floor, bounds) |
//! | [`engine`] | Top-level [`engine::RoomEngine`] and the [`engine::Action`] stream |
//! | [`interaction`] | Paint / drag / rotate state machine |
//! | [`placement`] | Async model loading and placed-object bookkeeping |
//! | [`export`] | Four-view capture and 2×2 collage composition |
//! | [`raster`] | Headless software renderer used for captures |
//! | [`camera`] | Screen points, viewport, perspective camera and picking rays |
//! | [`orbit`] | Orbit/zoom camera navigation |
//! | [`input`] | Buttons, gestures and the interaction state enum |
//! | [`hit`] | Ray-cast hit testing |
//! | [`geom`] | Rays, boxes and intersection math |
//! | [`objects`] | Placed objects and their store |
//! | [`assets`] | Model references, loader seams, glTF bounds parsing |
//! | [`color`] | Colors and paint swatches |
//! | [`config`] | Environment-driven engine configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod assets;
pub mod camera;
pub mod color;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod export;
pub mod geom;
pub mod grid;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod objects;
pub mod orbit;
pub mod placement;
pub mod raster;
pub mod scene;
