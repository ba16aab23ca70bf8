//! Pointer input: vector math, joystick controllers, widget geometry, and the
//! pointer-script event source.

pub mod geometry;
pub mod joystick;
pub mod script;
pub mod vector;

pub use geometry::{LiveLayout, WidgetGeometry};
pub use joystick::{Joystick, JoystickState, KnobCallback, KnobOffset, PointerId, StickRole};
pub use script::{PointerEvent, PointerKind};
pub use vector::{Point2, Vector2};
