//! Twin-stick pad: the two joysticks, their emission policies, and the channel
//!
//! All entry points are plain `&mut self` calls meant to be driven from one
//! event loop; each runs to completion before the next begins, so no gesture
//! state is ever locked.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::channel::MessageChannel;
use crate::config::TuningConfig;
use crate::emission::{AimEmitter, MoveSampler};
use crate::input::geometry::WidgetGeometry;
use crate::input::joystick::{Joystick, KnobCallback, PointerId, StickRole};
use crate::input::script::{PointerEvent, PointerKind};
use crate::input::vector::Point2;
use crate::session::Session;

pub struct TwinStickPad {
    move_stick: Joystick,
    aim_stick: Joystick,
    sampler: MoveSampler,
    aim: AimEmitter,
    channel: MessageChannel,
    session: Session,
}

impl TwinStickPad {
    pub fn new(
        tuning: &TuningConfig,
        move_widget: Arc<dyn WidgetGeometry>,
        aim_widget: Arc<dyn WidgetGeometry>,
        channel: MessageChannel,
        session: Session,
    ) -> Self {
        Self {
            move_stick: Joystick::new(StickRole::Move, move_widget)
                .with_deadzone(tuning.move_deadzone),
            aim_stick: Joystick::new(StickRole::Aim, aim_widget),
            sampler: MoveSampler::new(Duration::from_millis(tuning.move_interval_ms)),
            aim: AimEmitter::new(tuning.shoot_threshold),
            channel,
            session,
        }
    }

    /// Attach the knob redraw side effect to both sticks
    pub fn with_knob(mut self, knob: KnobCallback) -> Self {
        self.move_stick = self.move_stick.with_knob(Arc::clone(&knob));
        self.aim_stick = self.aim_stick.with_knob(knob);
        self
    }

    pub fn stick(&self, role: StickRole) -> &Joystick {
        match role {
            StickRole::Move => &self.move_stick,
            StickRole::Aim => &self.aim_stick,
        }
    }

    pub fn sampler(&self) -> &MoveSampler {
        &self.sampler
    }

    pub fn channel(&self) -> &MessageChannel {
        &self.channel
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Route a pointer event to the joystick it targets
    pub fn dispatch(&mut self, event: PointerEvent) {
        debug!(
            "{} {} pointer={} ({:.1}, {:.1})",
            event.stick, event.kind, event.pointer_id, event.point.x, event.point.y
        );

        match event.kind {
            PointerKind::Down => self.on_pointer_down(event.stick, event.pointer_id, event.point),
            PointerKind::Move => self.on_pointer_move(event.stick, event.pointer_id, event.point),
            PointerKind::Up | PointerKind::Cancel | PointerKind::Leave => {
                self.on_pointer_release(event.stick, event.pointer_id)
            }
        }
    }

    pub fn on_pointer_down(&mut self, role: StickRole, pointer_id: PointerId, point: Point2) {
        match role {
            StickRole::Move => self.move_stick.on_pointer_down(pointer_id, point),
            StickRole::Aim => self.aim_stick.on_pointer_down(pointer_id, point),
        };
    }

    pub fn on_pointer_move(&mut self, role: StickRole, pointer_id: PointerId, point: Point2) {
        match role {
            StickRole::Move => {
                // Sampled later by the ticker
                self.move_stick.on_pointer_move(pointer_id, point);
            }
            StickRole::Aim => {
                if let Some(vector) = self.aim_stick.on_pointer_move(pointer_id, point) {
                    self.aim.on_aim(vector, &self.channel);
                }
            }
        }
    }

    /// `pointerup`, `pointercancel` and `pointerleave` all land here
    pub fn on_pointer_release(&mut self, role: StickRole, pointer_id: PointerId) {
        match role {
            StickRole::Move => {
                self.move_stick.on_pointer_release(pointer_id);
            }
            StickRole::Aim => {
                if let Some(released) = self.aim_stick.on_pointer_release(pointer_id) {
                    self.aim.on_release(released, &self.channel);
                }
            }
        }
    }

    /// One move-sampler tick
    pub fn sample_move(&self) -> bool {
        self.sampler.tick(&self.move_stick, &self.channel)
    }

    /// Text frame received from the peer
    pub fn on_channel_text(&mut self, text: &str) {
        self.session.on_text(text);
    }
}
