//! Emission policies: when joystick vectors become frames
//!
//! The two sticks use different triggering disciplines and never share code
//! paths beyond the channel itself:
//!
//! - [`MoveSampler`] polls the move vector on a fixed period and sends it
//!   unconditionally, changed or not.
//! - [`AimEmitter`] sends every accepted aim move as it happens, then decides
//!   on release whether the gesture was a shot or just an aim adjustment.

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use crate::channel::MessageChannel;
use crate::input::joystick::Joystick;
use crate::input::vector::{angle_of, distance, Vector2};
use crate::protocol::OutgoingMessage;

/// Default move sampling period
pub const MOVE_INTERVAL: Duration = Duration::from_millis(50);

/// Default minimum aim release distance (pixels) that fires a shot
pub const SHOOT_THRESHOLD: f64 = 20.0;

/// Fixed-period sampler for the move stick
#[derive(Debug, Clone)]
pub struct MoveSampler {
    period: Duration,
}

impl Default for MoveSampler {
    fn default() -> Self {
        Self::new(MOVE_INTERVAL)
    }
}

impl MoveSampler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timer driving [`MoveSampler::tick`]; the first tick fires one period in
    pub fn ticker(&self) -> Interval {
        let start = tokio::time::Instant::now() + self.period;
        let mut ticker = tokio::time::interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Send the current move vector if the channel is open
    pub fn tick(&self, stick: &Joystick, channel: &MessageChannel) -> bool {
        channel.send_if_open(OutgoingMessage::move_vector(stick.vector()))
    }
}

/// Event-driven emitter for the aim stick
#[derive(Debug, Clone)]
pub struct AimEmitter {
    shoot_threshold: f64,
}

impl Default for AimEmitter {
    fn default() -> Self {
        Self::new(SHOOT_THRESHOLD)
    }
}

impl AimEmitter {
    pub fn new(shoot_threshold: f64) -> Self {
        Self { shoot_threshold }
    }

    pub fn shoot_threshold(&self) -> f64 {
        self.shoot_threshold
    }

    /// Forward an accepted aim move as raw pixels
    pub fn on_aim(&self, vector: Vector2, channel: &MessageChannel) -> bool {
        channel.send_if_open(OutgoingMessage::aim_vector(vector))
    }

    /// Angle to fire along for a gesture released at `released`, if any.
    ///
    /// Strictly greater than the threshold: a release exactly on it is a tap.
    pub fn shot_angle(&self, released: Vector2) -> Option<f64> {
        if distance(released) > self.shoot_threshold {
            Some(angle_of(released))
        } else {
            None
        }
    }

    /// Decide and emit the release command.
    ///
    /// Returns the angle when the release counts as a shot, whether or not the
    /// channel was open to carry it.
    pub fn on_release(&self, released: Vector2, channel: &MessageChannel) -> Option<f64> {
        let angle = self.shot_angle(released);
        match angle {
            Some(angle) => {
                channel.send_if_open(OutgoingMessage::ShootAngle { angle });
            }
            None => debug!(
                "Aim released at {:.1}px (threshold {:.1}px), no shot",
                distance(released),
                self.shoot_threshold
            ),
        }
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryTransport;
    use crate::config::WidgetConfig;
    use crate::input::joystick::StickRole;
    use std::sync::Arc;

    fn move_stick() -> Joystick {
        Joystick::new(
            StickRole::Move,
            Arc::new(WidgetConfig {
                center: Vector2::ZERO,
                width: 200.0,
            }),
        )
    }

    #[test]
    fn test_threshold_boundary() {
        let emitter = AimEmitter::default();

        assert_eq!(emitter.shot_angle(Vector2::new(20.0, 0.0)), None);
        assert_eq!(emitter.shot_angle(Vector2::new(0.0, -20.0)), None);
        assert_eq!(emitter.shot_angle(Vector2::new(12.0, 16.0)), None);

        let angle = emitter.shot_angle(Vector2::new(20.0 + 1e-9, 0.0));
        assert_eq!(angle, Some(0.0));
    }

    #[test]
    fn test_release_sends_shoot_when_far_enough() {
        let transport = MemoryTransport::open();
        let channel = MessageChannel::new(transport.clone(), "Alice");
        let emitter = AimEmitter::default();

        let angle = emitter.on_release(Vector2::new(30.0, 40.0), &channel);
        assert_eq!(angle, Some(40f64.atan2(30.0)));

        let sent = transport.take_envelopes();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].message,
            OutgoingMessage::ShootAngle {
                angle: 40f64.atan2(30.0)
            }
        );
    }

    #[test]
    fn test_light_tap_sends_nothing() {
        let transport = MemoryTransport::open();
        let channel = MessageChannel::new(transport.clone(), "Alice");

        assert_eq!(AimEmitter::default().on_release(Vector2::new(5.0, 5.0), &channel), None);
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn test_sampler_sends_unchanged_vector_every_tick() {
        let transport = MemoryTransport::open();
        let channel = MessageChannel::new(transport.clone(), "Alice");
        let sampler = MoveSampler::default();
        let stick = move_stick();

        for _ in 0..3 {
            assert!(sampler.tick(&stick, &channel));
        }

        let sent = transport.take_envelopes();
        assert_eq!(sent.len(), 3);
        assert!(sent
            .iter()
            .all(|e| e.message == OutgoingMessage::MoveVector { dx: 0.0, dy: 0.0 }));
    }

    #[test]
    fn test_sampler_silent_while_closed() {
        let transport = MemoryTransport::closed();
        let channel = MessageChannel::new(transport.clone(), "Alice");

        assert!(!MoveSampler::default().tick(&move_stick(), &channel));
        assert!(transport.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_period() {
        let sampler = MoveSampler::default();
        let mut ticker = sampler.ticker();

        let start = tokio::time::Instant::now();
        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(100));
    }
}
