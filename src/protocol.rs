//! Wire protocol exchanged with the remote peer
//!
//! Outgoing frames are flat JSON objects discriminated by `command` and always
//! carrying the sender's `pseudo`:
//!
//! ```json
//! {"pseudo":"Player42","command":"MOVE_VECTOR","dx":0.5,"dy":-0.25}
//! {"pseudo":"Player42","command":"AIM_VECTOR","dx":30.0,"dy":40.0}
//! {"pseudo":"Player42","command":"SHOOT_ANGLE","angle":0.927}
//! ```
//!
//! The only frame the client consumes is the identity assignment:
//!
//! ```json
//! {"type":"assign_id","player_id":3}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::input::vector::Vector2;

/// Command payload of an outgoing frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutgoingMessage {
    /// Sampled move vector, components roughly in [-1, 1]
    MoveVector { dx: f64, dy: f64 },
    /// Clamped raw aim displacement in pixels
    AimVector { dx: f64, dy: f64 },
    /// Fire along `angle` radians, range (-π, π]
    ShootAngle { angle: f64 },
}

impl OutgoingMessage {
    pub fn move_vector(v: Vector2) -> Self {
        OutgoingMessage::MoveVector { dx: v.x, dy: v.y }
    }

    pub fn aim_vector(v: Vector2) -> Self {
        OutgoingMessage::AimVector { dx: v.x, dy: v.y }
    }

    /// Command name as it appears on the wire
    pub fn command(&self) -> &'static str {
        match self {
            OutgoingMessage::MoveVector { .. } => "MOVE_VECTOR",
            OutgoingMessage::AimVector { .. } => "AIM_VECTOR",
            OutgoingMessage::ShootAngle { .. } => "SHOOT_ANGLE",
        }
    }
}

/// Outgoing frame: the player's display identity plus one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub pseudo: String,
    #[serde(flatten)]
    pub message: OutgoingMessage,
}

impl Envelope {
    pub fn new(pseudo: impl Into<String>, message: OutgoingMessage) -> Self {
        Self {
            pseudo: pseudo.into(),
            message,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Identity token handed out by the peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerToken {
    Number(u64),
    Text(String),
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerToken::Number(n) => write!(f, "{}", n),
            PlayerToken::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Frames received from the peer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    AssignId { player_id: PlayerToken },
}

impl IncomingMessage {
    /// Decode a text frame; `None` for anything the client does not consume
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn encoded(envelope: &Envelope) -> Value {
        serde_json::from_str(&envelope.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_move_vector_wire_shape() {
        let envelope = Envelope::new(
            "Alice",
            OutgoingMessage::move_vector(Vector2::new(1.0, 0.0)),
        );
        assert_eq!(
            encoded(&envelope),
            json!({"pseudo": "Alice", "command": "MOVE_VECTOR", "dx": 1.0, "dy": 0.0})
        );
    }

    #[test]
    fn test_aim_vector_wire_shape() {
        let envelope = Envelope::new(
            "Bob",
            OutgoingMessage::aim_vector(Vector2::new(30.0, -40.0)),
        );
        assert_eq!(
            encoded(&envelope),
            json!({"pseudo": "Bob", "command": "AIM_VECTOR", "dx": 30.0, "dy": -40.0})
        );
    }

    #[test]
    fn test_shoot_angle_wire_shape() {
        let envelope = Envelope::new("Eve", OutgoingMessage::ShootAngle { angle: 1.5 });
        assert_eq!(
            encoded(&envelope),
            json!({"pseudo": "Eve", "command": "SHOOT_ANGLE", "angle": 1.5})
        );
        assert_eq!(envelope.message.command(), "SHOOT_ANGLE");
    }

    #[test]
    fn test_assign_id_numeric_and_text() {
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"assign_id","player_id":3}"#),
            Some(IncomingMessage::AssignId {
                player_id: PlayerToken::Number(3)
            })
        );
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"assign_id","player_id":"p-7"}"#),
            Some(IncomingMessage::AssignId {
                player_id: PlayerToken::Text("p-7".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_frames_are_not_consumed() {
        assert_eq!(IncomingMessage::parse(r#"{"type":"scoreboard"}"#), None);
        assert_eq!(IncomingMessage::parse(r#"{"type":"assign_id"}"#), None);
        assert_eq!(IncomingMessage::parse("not json"), None);
    }
}
