//! Joystick controller: pointer capture and displacement vector for one widget
//!
//! Two states per joystick:
//!
//! - **Idle**: no active pointer, vector is zero
//! - **Active**: one captured pointer, vector follows its moves
//!
//! `pointerdown` moves Idle → Active, a matching `pointerup`/`pointercancel`/
//! `pointerleave` moves Active → Idle. Every other event is a no-op, which lets
//! other fingers touch the screen without disturbing the gesture.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use super::geometry::WidgetGeometry;
use super::vector::{clamp_to_radius, distance, normalize, Point2, Vector2};

/// Default move-stick deadzone, in pixels from the center
pub const MOVE_DEADZONE: f64 = 10.0;

/// Pointer identifier assigned by the host environment
pub type PointerId = i64;

/// Which of the two joysticks a controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickRole {
    /// Normalized, deadzoned motion vector
    Move,
    /// Raw pixel displacement, no deadzone
    Aim,
}

impl fmt::Display for StickRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StickRole::Move => write!(f, "move"),
            StickRole::Aim => write!(f, "aim"),
        }
    }
}

/// Visual position of the knob inside its widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnobOffset {
    /// Centered, no gesture in progress
    Resting,
    /// Translated by the (clamped) pixel displacement
    Displaced(Vector2),
}

/// Callback invoked whenever a knob must be redrawn
pub type KnobCallback = Arc<dyn Fn(StickRole, KnobOffset) + Send + Sync>;

/// Gesture state owned by one joystick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoystickState {
    pub active_pointer: Option<PointerId>,
    pub center: Point2,
    pub vector: Vector2,
}

/// One on-screen joystick
pub struct Joystick {
    role: StickRole,
    state: JoystickState,
    geometry: Arc<dyn WidgetGeometry>,
    deadzone: f64,
    knob: Option<KnobCallback>,
}

impl Joystick {
    pub fn new(role: StickRole, geometry: Arc<dyn WidgetGeometry>) -> Self {
        Self {
            role,
            state: JoystickState::default(),
            geometry,
            deadzone: MOVE_DEADZONE,
            knob: None,
        }
    }

    /// Override the move deadzone (ignored by the aim role)
    pub fn with_deadzone(mut self, deadzone: f64) -> Self {
        self.deadzone = deadzone;
        self
    }

    /// Attach the knob redraw side effect
    pub fn with_knob(mut self, knob: KnobCallback) -> Self {
        self.knob = Some(knob);
        self
    }

    pub fn role(&self) -> StickRole {
        self.role
    }

    pub fn state(&self) -> &JoystickState {
        &self.state
    }

    /// Current vector (zero while idle)
    pub fn vector(&self) -> Vector2 {
        self.state.vector
    }

    pub fn is_active(&self) -> bool {
        self.state.active_pointer.is_some()
    }

    /// Capture `pointer_id` if no pointer is active.
    ///
    /// Returns `true` when the pointer was captured.
    pub fn on_pointer_down(&mut self, pointer_id: PointerId, _point: Point2) -> bool {
        if self.state.active_pointer.is_some() {
            return false;
        }

        self.state.active_pointer = Some(pointer_id);
        self.state.center = self.geometry.center();
        trace!(
            "{} stick captured pointer {} at center ({:.1}, {:.1})",
            self.role,
            pointer_id,
            self.state.center.x,
            self.state.center.y
        );
        true
    }

    /// Track the active pointer.
    ///
    /// Returns the updated vector, or `None` when the event belongs to another
    /// pointer and was ignored.
    pub fn on_pointer_move(&mut self, pointer_id: PointerId, point: Point2) -> Option<Vector2> {
        if self.state.active_pointer != Some(pointer_id) {
            return None;
        }

        let radius = self.geometry.radius();
        let raw = point - self.state.center;
        let dist = distance(raw);
        let displacement = if dist > radius {
            clamp_to_radius(raw, radius)
        } else {
            raw
        };

        self.redraw_knob(KnobOffset::Displaced(displacement));

        self.state.vector = match self.role {
            StickRole::Move => self.move_vector(displacement, dist, radius),
            StickRole::Aim => displacement,
        };

        Some(self.state.vector)
    }

    /// Release the active pointer (`pointerup`, `pointercancel`, `pointerleave`).
    ///
    /// Returns the vector as it stood just before the reset, or `None` when the
    /// event was ignored.
    pub fn on_pointer_release(&mut self, pointer_id: PointerId) -> Option<Vector2> {
        if self.state.active_pointer != Some(pointer_id) {
            return None;
        }

        self.state.active_pointer = None;
        self.redraw_knob(KnobOffset::Resting);

        let released = self.state.vector;
        self.state.vector = Vector2::ZERO;
        trace!("{} stick released pointer {}", self.role, pointer_id);
        Some(released)
    }

    pub fn on_pointer_up(&mut self, pointer_id: PointerId) -> Option<Vector2> {
        self.on_pointer_release(pointer_id)
    }

    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Option<Vector2> {
        self.on_pointer_release(pointer_id)
    }

    pub fn on_pointer_leave(&mut self, pointer_id: PointerId) -> Option<Vector2> {
        self.on_pointer_release(pointer_id)
    }

    /// Deadzoned vector scaled from 0 at the center to 1 at the rim.
    ///
    /// The magnitude uses the unclamped pointer distance, so dragging past the
    /// rim keeps growing it beyond 1.
    fn move_vector(&self, displacement: Vector2, dist: f64, radius: f64) -> Vector2 {
        if dist < self.deadzone || radius <= 0.0 || displacement.is_zero() {
            return Vector2::ZERO;
        }

        let magnitude = dist / radius;
        normalize(displacement) * magnitude
    }

    fn redraw_knob(&self, offset: KnobOffset) {
        if let Some(knob) = &self.knob {
            knob(self.role, offset);
        }
    }
}
