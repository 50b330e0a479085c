//! Input model: mouse buttons, gestures, and the interaction state machine's states.
//!
//! A raw button code is turned into a [`Button`] once at the host boundary,
//! and a button into an [`InputGesture`] once per pointer-down. Handlers match
//! on the gesture rather than re-deriving intent from button codes.
//! [`InteractionState`] is the active mode between events, carrying whatever
//! context the next event needs.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::color::Color;
use crate::objects::ObjectId;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code. Unknown codes count as primary.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// What a press on a placed object means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputGesture {
    /// Slide the object across the floor.
    Drag,
    /// Spin the object about the vertical axis.
    Rotate,
}

impl InputGesture {
    /// Resolve the gesture for a pressed button. The middle button has none.
    #[must_use]
    pub fn from_button(button: Button) -> Option<Self> {
        match button {
            Button::Primary => Some(Self::Drag),
            Button::Secondary => Some(Self::Rotate),
            Button::Middle => None,
        }
    }
}

/// Wheel / trackpad scroll delta. Only the vertical axis zooms.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A paint color is chosen; the next wall click applies it.
    PaintArmed {
        color: Color,
        /// Where the primary button went down, if it is still down.
        press: Option<Point>,
    },
    /// An object follows the pointer across the floor.
    ObjectSelectedDrag {
        id: ObjectId,
        /// Screen position of the press that selected the object.
        press: Point,
    },
    /// An object spins with horizontal pointer movement.
    ObjectSelectedRotate {
        id: ObjectId,
        /// Screen x of the previous pointer event.
        last_x: f64,
    },
}

impl InteractionState {
    /// The object held by the current gesture, if any.
    #[must_use]
    pub fn active_object(&self) -> Option<ObjectId> {
        match *self {
            Self::ObjectSelectedDrag { id, .. } | Self::ObjectSelectedRotate { id, .. } => Some(id),
            Self::Idle | Self::PaintArmed { .. } => None,
        }
    }

    /// The gesture holding the active object, if any.
    #[must_use]
    pub fn gesture(&self) -> Option<InputGesture> {
        match self {
            Self::ObjectSelectedDrag { .. } => Some(InputGesture::Drag),
            Self::ObjectSelectedRotate { .. } => Some(InputGesture::Rotate),
            Self::Idle | Self::PaintArmed { .. } => None,
        }
    }

    #[must_use]
    pub fn is_paint_armed(&self) -> bool {
        matches!(self, Self::PaintArmed { .. })
    }
}
